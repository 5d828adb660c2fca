use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use triage::models::patient::{HISTORY_OPTIONS, SYMPTOM_OPTIONS};
use triage::models::{FormField, Gender, MultiField, PatientInput};
use triage::AdmissionForm;

fn random_admission(rng: &mut impl Rng) -> PatientInput {
    let mut form = AdmissionForm::new();
    form.set_field(FormField::Age, (1..110u32).fake::<u32>().to_string());
    form.set_field(
        FormField::Gender,
        Gender::ALL.choose(rng).map(|g| g.as_str()).unwrap_or("Other"),
    );
    form.set_field(FormField::SystolicBp, (80..220u32).fake::<u32>().to_string());
    form.set_field(FormField::DiastolicBp, (40..130u32).fake::<u32>().to_string());
    form.set_field(FormField::HeartRate, (30..200u32).fake::<u32>().to_string());
    form.set_field(FormField::Temperature, format!("{:.1}", (34.0..42.0).fake::<f64>()));
    form.set_field(
        FormField::OxygenSaturation,
        format!("{:.0}", (70.0..100.0).fake::<f64>()),
    );

    let symptom_count = rng.gen_range(0..=SYMPTOM_OPTIONS.len());
    let mut symptoms: Vec<String> = SYMPTOM_OPTIONS
        .choose_multiple(rng, symptom_count)
        .map(|s| s.to_string())
        .collect();
    if rng.gen_bool(0.3) {
        symptoms.push(Word().fake());
    }
    form.set_multi_field(MultiField::Symptoms, symptoms.join(","));

    let history_count = rng.gen_range(0..=HISTORY_OPTIONS.len());
    let history: Vec<&str> = HISTORY_OPTIONS
        .choose_multiple(rng, history_count)
        .copied()
        .collect();
    form.set_multi_field(MultiField::MedicalHistory, history);

    form.snapshot().unwrap()
}

#[test]
fn wire_body_decodes_to_the_same_admission() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let input = random_admission(&mut rng);
        let encoded = serde_json::to_string(&input).unwrap();
        let decoded: PatientInput = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, input, "body: {encoded}");
    }
}

#[test]
fn wire_body_uses_text_values_and_exact_keys() {
    let mut rng = rand::thread_rng();
    let body = serde_json::to_value(random_admission(&mut rng)).unwrap();
    let object = body.as_object().unwrap();

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "Age",
            "DiastolicBP",
            "Gender",
            "Heart_Rate",
            "Medical_History",
            "Oxygen_Saturation",
            "Symptoms",
            "SystolicBP",
            "Temperature",
        ]
    );
    for field in FormField::ALL {
        assert!(object[field.wire_name()].is_string(), "{field} should be text");
    }
}

#[test]
fn free_text_tokens_with_commas_survive_the_wire() {
    let mut rng = rand::thread_rng();
    let mut form = AdmissionForm::from_input(&random_admission(&mut rng));
    form.toggle_item(MultiField::Symptoms, "Pain, left arm");
    let words: Vec<String> = (0..3).map(|_| Word().fake::<String>()).collect();
    let history = vec!["Asthma".to_string(), words.join(", ")];
    form.set_multi_field(MultiField::MedicalHistory, history.clone());

    let input = form.snapshot().unwrap();
    assert!(input.items(MultiField::Symptoms).iter().any(|s| s == "Pain, left arm"));
    assert_eq!(input.items(MultiField::MedicalHistory), history.as_slice());

    let encoded = serde_json::to_string(&input).unwrap();
    let decoded: PatientInput = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, input, "body: {encoded}");
}

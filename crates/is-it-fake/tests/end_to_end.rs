use std::path::Path;

use is_it_fake::{
    Detector, FAKE_THRESHOLD, Label, RawPosting, TrainedPipeline,
    training::{self, Dataset, TrainingConfig},
};

const FAKE_TITLES: [&str; 4] = [
    "Data Entry Clerk",
    "Home Based Typist",
    "Payment Processing Agent",
    "Online Survey Assistant",
];
const FAKE_DESCRIPTIONS: [&str; 4] = [
    "Work from home, no experience needed, send SSN and bank details to apply",
    "Earn cash weekly working from home, wire transfer fee required to start",
    "Data entry from home, send copy of SSN, start today, no interview",
    "Instant hire, work from home, pay upfront training kit fee via wire",
];
const FAKE_BENEFITS: [&str; 3] = [
    "High pay guaranteed",
    "Guaranteed weekly cash payments",
    "Earn high pay from home guaranteed",
];

const REAL_TITLES: [&str; 5] = [
    "Senior Software Engineer",
    "Registered Nurse",
    "Staff Accountant",
    "Marketing Coordinator",
    "Warehouse Supervisor",
];
const REAL_DESCRIPTIONS: [&str; 5] = [
    "Design and maintain distributed services with our platform team",
    "Provide patient care on rotating hospital shifts alongside physicians",
    "Prepare monthly financial statements and support the annual audit",
    "Coordinate campaigns, manage social channels and report on analytics",
    "Lead a shift of associates, manage inventory and enforce safety standards",
];
const REAL_BENEFITS: [&str; 3] = [
    "Health insurance, dental coverage, 401k matching",
    "Paid time off, pension plan, tuition reimbursement",
    "Medical and vision plans, parental leave, stock options",
];

fn write_dataset(path: &Path) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer
        .write_record([
            "job_id",
            "title",
            "company_profile",
            "description",
            "requirements",
            "benefits",
            "fraudulent",
        ])
        .unwrap();

    let mut id = 0;
    for i in 0..24 {
        id += 1;
        writer
            .write_record([
                id.to_string().as_str(),
                FAKE_TITLES[i % FAKE_TITLES.len()],
                "Fast growing opportunity",
                FAKE_DESCRIPTIONS[i % FAKE_DESCRIPTIONS.len()],
                "None",
                FAKE_BENEFITS[i % FAKE_BENEFITS.len()],
                "1",
            ])
            .unwrap();
    }
    for i in 0..60 {
        id += 1;
        writer
            .write_record([
                id.to_string().as_str(),
                REAL_TITLES[i % REAL_TITLES.len()],
                "We are a regional employer with offices across the state",
                REAL_DESCRIPTIONS[i % REAL_DESCRIPTIONS.len()],
                "Bachelor degree and three years of relevant professional background",
                REAL_BENEFITS[i % REAL_BENEFITS.len()],
                "0",
            ])
            .unwrap();
    }
    // incomplete rows are dropped
    writer
        .write_record(["998", "Clerk", "", "desc", "req", "ben", "1"])
        .unwrap();
    writer
        .write_record(["999", "Clerk", "Firm", "desc", "req", "ben", ""])
        .unwrap();
    writer.flush().unwrap();
}

fn scam_posting() -> RawPosting {
    RawPosting {
        title: Some("Data Entry Clerk".into()),
        company_profile: Some("Established firm".into()),
        description: Some("Work from home, no experience needed, send SSN to apply".into()),
        requirements: Some("None".into()),
        benefits: Some("High pay guaranteed".into()),
    }
}

#[test]
fn train_persist_reload_and_score() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("postings.csv");
    let artifact_path = dir.path().join("model").join("job_pipeline.bin");
    write_dataset(&dataset_path);

    let config = TrainingConfig::default();
    let report = training::train(&dataset_path, &artifact_path, &config).unwrap();
    assert_eq!(report.rows_used, 84);
    assert_eq!(report.rows_dropped, 2);
    assert_eq!(report.test_rows, 17);
    assert_eq!(report.train_rows, 67);
    assert!(report.num_features > 0);
    assert!(report.evaluation.is_some());

    let detector = Detector::load(&artifact_path).unwrap();
    let result = detector.score(scam_posting()).unwrap();
    assert_eq!(result.prediction, Label::Fake);
    assert!(result.fake_probability >= FAKE_THRESHOLD * 100.0);
    assert!((result.fake_probability + result.real_probability - 100.0).abs() <= 0.01);

    // scoring twice against the same artifact is identical
    assert_eq!(result, detector.score(scam_posting()).unwrap());
}

#[test]
fn reloaded_pipeline_matches_in_memory_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("postings.csv");
    let artifact_path = dir.path().join("job_pipeline.bin");
    write_dataset(&dataset_path);

    let dataset = Dataset::from_path(&dataset_path).unwrap();
    let (pipeline, _) = training::fit_dataset(&dataset, &TrainingConfig::default()).unwrap();
    pipeline.save(&artifact_path).unwrap();
    let reloaded = TrainedPipeline::load(&artifact_path).unwrap();

    let (_, test_idx) = training::train_test_split(dataset.len(), 0.2, 42).unwrap();
    let held_out: Vec<&str> = test_idx
        .iter()
        .map(|&i| dataset.records[i].text.as_str())
        .collect();
    let before = pipeline.predict_texts(&held_out);
    let after = reloaded.predict_texts(&held_out);
    assert_eq!(before, after);
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(
            b.classification(FAKE_THRESHOLD),
            a.classification(FAKE_THRESHOLD)
        );
    }
}

#[test]
fn training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("postings.csv");
    write_dataset(&dataset_path);
    let dataset = Dataset::from_path(&dataset_path).unwrap();

    let (first, _) = training::fit_dataset(&dataset, &TrainingConfig::default()).unwrap();
    let (second, _) = training::fit_dataset(&dataset, &TrainingConfig::default()).unwrap();
    assert_eq!(first.classifier(), second.classifier());
}

#[test]
fn missing_label_column_fails_before_fitting() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("bad.csv");
    std::fs::write(
        &dataset_path,
        "title,company_profile,description,requirements,benefits\nA,B,C,D,E\n",
    )
    .unwrap();
    let artifact_path = dir.path().join("never.bin");
    let err = training::train(&dataset_path, &artifact_path, &TrainingConfig::default())
        .unwrap_err();
    assert!(matches!(err, is_it_fake::DetectorError::TrainingDataInvalid(_)));
    assert!(!artifact_path.exists());
}

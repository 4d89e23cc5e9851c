use ocr_extractor_rust::aggregate;
use ocr_extractor_rust::record::{ExtractionPolicy, OcrBundle, build_record};

#[test]
fn product_listing_record() {
    let candidates = vec![
        "[PARAGRAPH] ASUS AirVision M1 Smart Glasses".to_string(),
        "Regular price ¥124,896\nSale price: Half 64,800\nShips March 15, 2026".to_string(),
        "[CURRENCY] Half 64,800".to_string(),
    ];
    let text = aggregate::aggregate_candidates(&candidates);
    let bundle = OcrBundle {
        original_text: text.clone(),
        english_text: Some(text),
        detected_languages: vec!["en".to_string()],
        translation_confidence: 1.0,
        total_results_found: candidates.len(),
    };
    let record = build_record(&bundle, &[], &ExtractionPolicy::default(), None);
    insta::assert_json_snapshot!("product_listing_record", record);
}

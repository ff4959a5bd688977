// Request construction, response parsing, data URIs and reference preprocessing.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use wishverse_core::data_uri::*;
use wishverse_core::generate::*;
use wishverse_core::imaging::*;

fn png_data_uri(img: RgbaImage) -> String {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    format_data_uri("image/png", &base64_encode(&buf))
}

#[test]
fn refinement_rule() {
    let r = GenerationRequest::new("p", Some("up"), Some("prev"));
    assert_eq!(r.reference.as_deref(), Some("up"));
    assert!(!r.refinement);

    let r = GenerationRequest::new("p", None, Some("prev"));
    assert_eq!(r.reference.as_deref(), Some("prev"));
    assert!(r.refinement);

    let r = GenerationRequest::new("p", None, None);
    assert_eq!(r.reference, None);
    assert!(!r.refinement);
}

#[test]
fn prompt_cases() {
    let upload = build_prompt("extra cherries", true, false);
    assert!(upload.starts_with("Redraw this exact cake"));
    assert!(upload.contains("User Note: extra cherries."));

    let refine = build_prompt("more gold", true, true);
    assert!(refine.starts_with("Refine this anime cake illustration"));
    assert!(refine.contains("User Request: \"more gold\""));

    let text = build_prompt("pink wings", false, false);
    assert!(text.starts_with("Generate a Cardcaptor Sakura style anime cake"));
    assert!(text.contains("Soft Pastels"));

    for p in [upload, refine, text] {
        assert!(p.contains("STRICT STYLE TRANSFER"));
        assert!(p.ends_with("Do not change the flavor or color of the food itself."));
    }
}

#[test]
fn request_body_wire_shape() {
    let body = request_body("hello".into(), Some("QUJD".into()), "3:4");
    let json = serde_json::to_value(&body).unwrap();
    let parts = &json["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
    assert_eq!(parts[1]["text"], "hello");
    assert!(parts[1].get("inlineData").is_none());
    assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");

    let text_only = serde_json::to_value(request_body("x".into(), None, "3:4")).unwrap();
    assert_eq!(text_only["contents"][0]["parts"].as_array().unwrap().len(), 1);
}

#[test]
fn response_picks_first_inline_image() {
    let body = r#"{"candidates":[{"content":{"parts":[
        {"text":"here you go"},
        {"inlineData":{"mimeType":"image/png","data":""}},
        {"inlineData":{"mimeType":"image/webp","data":"V0VCUA=="}},
        {"inlineData":{"mimeType":"image/png","data":"UE5H"}}
    ]}}]}"#;
    assert_eq!(parse_response(body).unwrap(), "data:image/webp;base64,V0VCUA==");

    let no_mime = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"UE5H"}}]}}]}"#;
    assert_eq!(parse_response(no_mime).unwrap(), "data:image/png;base64,UE5H");
}

#[test]
fn response_without_image_is_an_error() {
    assert!(matches!(parse_response(r#"{"candidates":[]}"#), Err(GenerationError::NoImage)));
    assert!(matches!(
        parse_response(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#),
        Err(GenerationError::NoImage)
    ));
    assert!(matches!(parse_response("not json"), Err(GenerationError::Parse(_))));
}

#[test]
fn config_overrides_and_endpoint() {
    let base = GeneratorConfig::default();
    assert_eq!(base.aspect_ratio, "3:4");
    assert_eq!(base.max_reference_edge, 512);
    let c = base.with_overrides(Some(" key ".into()), Some("".into()));
    assert_eq!(c.api_key, "key");
    assert_eq!(c.model, GeneratorConfig::default().model);
    let c = GeneratorConfig {
        base_url: "https://example.test/v1beta/".into(),
        ..c.with_overrides(None, Some("m1".into()))
    };
    assert_eq!(c.endpoint(), "https://example.test/v1beta/models/m1:generateContent");
}

// ---------------- data URIs ----------------

#[test]
fn base64_known_vectors() {
    let cases: [(&str, &str); 7] = [
        ("", ""),
        ("f", "Zg=="),
        ("fo", "Zm8="),
        ("foo", "Zm9v"),
        ("foob", "Zm9vYg=="),
        ("fooba", "Zm9vYmE="),
        ("foobar", "Zm9vYmFy"),
    ];
    for (plain, encoded) in cases {
        assert_eq!(base64_encode(plain.as_bytes()), encoded);
        assert_eq!(base64_decode(encoded).unwrap(), plain.as_bytes());
    }
    assert_eq!(base64_decode("Zm9vYg").unwrap(), b"foob");
    assert!(base64_decode("Zm9v!").is_none());
    assert!(base64_decode("Z").is_none());
    assert!(base64_decode("Zg==Zg").is_none());
}

#[test]
fn data_uri_parse() {
    let uri = DataUri::parse("data:image/png;base64,UE5H").unwrap();
    assert_eq!(uri.mime, "image/png");
    assert_eq!(uri.payload, "UE5H");
    assert_eq!(uri.decode().unwrap(), b"PNG");
    assert!(DataUri::parse("https://example.test/a.png").is_none());
    assert!(DataUri::parse("data:text/plain,hello").is_none());
    assert_eq!(strip_data_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
    assert_eq!(strip_data_prefix("QUJD"), "QUJD");
}

// ---------------- reference preprocessing ----------------

#[test]
fn fit_within_keeps_aspect() {
    assert_eq!(fit_within(1024, 600, 512), (512, 300));
    assert_eq!(fit_within(600, 1200, 512), (256, 512));
    assert_eq!(fit_within(512, 512, 512), (512, 512));
    assert_eq!(fit_within(300, 200, 512), (300, 200));
    assert_eq!(fit_within(5000, 2, 512), (512, 1));
}

#[test]
fn reference_is_downscaled_opaque_jpeg() {
    let img = RgbaImage::from_pixel(1024, 600, Rgba([255, 0, 0, 0]));
    let out = prepare_reference(&png_data_uri(img), 512, 70).unwrap();
    let uri = DataUri::parse(&out).unwrap();
    assert_eq!(uri.mime, "image/jpeg");

    let bytes = uri.decode().unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (512, 300));
    // fully transparent input flattens to white
    let px = decoded.to_rgb8().get_pixel(256, 150).0;
    assert!(px.iter().all(|&c| c > 240), "{px:?}");
}

#[test]
fn small_reference_keeps_size() {
    let img = RgbaImage::from_pixel(40, 30, Rgba([10, 120, 40, 255]));
    let out = prepare_reference(&png_data_uri(img), 512, 70).unwrap();
    let bytes = DataUri::parse(&out).unwrap().decode().unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (40, 30));
}

#[test]
fn unreadable_reference_falls_back_to_original_payload() {
    assert_eq!(reference_payload("data:image/png;base64,QUJD", 512, 70), "QUJD");
    assert_eq!(reference_payload("not a uri", 512, 70), "not a uri");
    assert!(matches!(prepare_reference("nope", 512, 70), Err(ImagingError::NotDataUri)));
}

#[test]
fn flatten_blends_partial_alpha() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
    let flat = flatten_on_white(&img);
    let v = flat.get_pixel(0, 0).0[0];
    assert!((126..=128).contains(&v), "{v}");
}

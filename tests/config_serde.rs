//! Loading show configurations from JSON (requires the `serde` feature).

#![cfg(feature = "serde")]

use skyglyph::{BehaviourConfig, BurstShape, Effect, Preset, Request, ShowConfig, Vec3};

#[test]
fn test_preset_round_trips_through_json() {
    let config = ShowConfig::preset(Preset::Willow).with_seed(5);
    let json = serde_json::to_string(&config).unwrap();
    let parsed: ShowConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_hand_written_config() {
    let base = serde_json::to_value(ShowConfig::preset(Preset::Ring)).unwrap();
    let burst = base["slots"][0]["behaviour"].clone();
    assert_eq!(burst["kind"], "burst");
    assert_eq!(burst["shape"], "Ring");

    let json = serde_json::json!({
        "seed": 42,
        "slots": [
            { "behaviour": burst },
            {
                "behaviour": base["slots"][1]["behaviour"].clone(),
                "effects": [
                    { "Trail": { "stretch_multiplier": 0.1, "max_stretch_length": 1.0, "min_velocity": 0.5 } }
                ]
            }
        ]
    });

    let config: ShowConfig = serde_json::from_value(json).unwrap();
    assert_eq!(config.seed, Some(42));
    assert!(config.slots[0].effects.is_empty());
    assert!(matches!(
        &config.slots[0].behaviour,
        BehaviourConfig::Burst(b) if b.shape == BurstShape::Ring
    ));
    assert!(matches!(config.slots[1].effects[0], Effect::Trail(_)));

    let mut show = config.build();
    show.handle_request(Request::empty(Vec3::ZERO));
    assert!(show.is_playing());
}

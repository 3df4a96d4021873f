use minter_node::config::{load_config, MinterConfig};
use std::env;
use std::io::Write;

#[test]
fn defaults_cover_mock_mode_with_zero_configuration() {
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg.node.label, "minter-node");
    assert_eq!(cfg.chain.confirmation_depth, 1);
    assert_eq!(cfg.pinning.base_url, "https://api.pinata.cloud");
    assert_eq!(cfg.gateways.bases.len(), 3);
    assert!(cfg.gateways.bases[0].contains("gateway.pinata.cloud"));
    assert!(cfg.explorer.base_url.contains("blockscout"));
}

#[test]
fn env_refs_resolve_and_explicit_overrides_win() {
    env::set_var("TEST_MINTER_PIN_KEY", "key-from-ref");
    env::set_var("PINATA_API_SECRET", "secret-from-override");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[node]
label = "test-minter"

[chain]
rpc_url = "https://rpc.example"
chain_id = 123420001114
token_contract = "0xC562c59452c2C721d22353dE428Ec211C4069f60"
badge_contract = "0xC562c59452c2C721d22353dE428Ec211C4069f60"

[pinning]
api_key = "env:TEST_MINTER_PIN_KEY"
api_secret = "secret-from-file"
"#
    )
    .unwrap();

    let cfg = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.node.label, "test-minter");
    assert_eq!(cfg.pinning.api_key, "key-from-ref");
    // The explicit environment override beats the file value.
    assert_eq!(cfg.pinning.api_secret, "secret-from-override");

    env::remove_var("PINATA_API_SECRET");
    env::remove_var("TEST_MINTER_PIN_KEY");
}

#[test]
fn missing_env_ref_is_a_load_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[pinning]
api_key = "env:DEFINITELY_NOT_SET_MINTER_VAR"
"#
    )
    .unwrap();

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(err
        .to_string()
        .contains("DEFINITELY_NOT_SET_MINTER_VAR"));
}

#[test]
fn http_mode_validation_requires_chain_settings() {
    let cfg = MinterConfig::default();
    let err = cfg.validate_for_chain_mode_http().unwrap_err();
    assert!(err.to_string().contains("chain.rpc_url"));

    let mut cfg = MinterConfig::default();
    cfg.chain.rpc_url = "https://rpc.example".to_string();
    cfg.chain.chain_id = 1;
    cfg.chain.token_contract = "0x01".to_string();
    cfg.chain.badge_contract = "0x02".to_string();
    assert!(cfg.validate_for_chain_mode_http().is_ok());
}

// tests/common.rs
use std::sync::Once;

static INIT: Once = Once::new();

// Initializes logging (and .env for the ignored live tests) exactly once
// across the whole test binary.
pub fn setup() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        env_logger::builder().is_test(true).try_init().ok();
    });
}

#[allow(dead_code)]
pub fn get_env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{} environment variable not set", name))
}

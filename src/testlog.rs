//! Test logging.
//!
//! Routes the `log` output of the crate to the test harness, so that it
//! shows up with `--nocapture`.

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

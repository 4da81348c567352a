//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw string value, `None` when the section or key is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Integer value, falling back to `default` when missing or unparseable.
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    /// Float value, falling back to `default` when missing or unparseable.
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}

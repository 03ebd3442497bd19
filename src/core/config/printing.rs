use crate::core::config::data::{Config, ResolvedSettings};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.endpoint {
            Some(endpoint) => println!("  endpoint: {endpoint}"),
            None => println!("  endpoint: (unset)"),
        }
        match &self.wire_format {
            Some(format) => println!("  wire-format: {format}"),
            None => println!("  wire-format: (unset)"),
        }
        match self.markdown.unwrap_or(true) {
            true => println!("  markdown: on"),
            false => println!("  markdown: off"),
        }
    }
}

impl ResolvedSettings {
    pub fn print_effective(&self) {
        println!("Effective settings:");
        println!("  endpoint: {}", self.endpoint);
        println!("  wire-format: {}", self.wire_format);
        println!("  markdown: {}", if self.markdown { "on" } else { "off" });
    }
}

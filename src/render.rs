//! Output sink abstraction
//!
//! The presentation surface is injected into the pipeline behind a trait
//! with one setter per display field, so the render path can be exercised
//! against a fake sink in tests.

use crate::weather::WeatherReport;

/// Write-only presentation surface for one weather report
pub trait RenderSink {
    /// Set the city display name
    fn set_city(&mut self, name: &str);
    /// Set the formatted temperature (e.g. "17°C")
    fn set_temperature(&mut self, formatted: &str);
    /// Set the primary condition keyword (e.g. "Clouds")
    fn set_condition(&mut self, main: &str);
    /// Set the longer condition description
    fn set_description(&mut self, description: &str);
    /// Set the condition icon image URL
    fn set_icon(&mut self, url: &str);
    /// Show a blocking notification (e.g. "Place not found")
    fn notify(&mut self, message: &str);
}

/// Project a report onto a sink, field by field
pub fn render_report<S: RenderSink + ?Sized>(sink: &mut S, report: &WeatherReport) {
    sink.set_city(&report.city_name);
    sink.set_temperature(&report.format_temperature());
    sink.set_condition(&report.condition_main);
    sink.set_description(&report.condition_description);
    sink.set_icon(&report.icon_url());
}

/// Sink that renders to the terminal
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a new console sink
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RenderSink for ConsoleSink {
    fn set_city(&mut self, name: &str) {
        println!("City:        {name}");
    }

    fn set_temperature(&mut self, formatted: &str) {
        println!("Temperature: {formatted}");
    }

    fn set_condition(&mut self, main: &str) {
        println!("Conditions:  {main}");
    }

    fn set_description(&mut self, description: &str) {
        println!("Details:     {description}");
    }

    fn set_icon(&mut self, url: &str) {
        println!("Icon:        {url}");
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

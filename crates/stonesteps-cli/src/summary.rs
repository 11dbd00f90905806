use std::path::{Path, PathBuf};

use console::Style;
use stonesteps_core::pipeline::config::{AuxFileConfig, MasterBiasConfig, MasterFlatConfig, RgbConfig};
use stonesteps_core::pipeline::StepOutput;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
        }
    }

    fn heading(&self, title: &str) {
        println!();
        println!("  {}", self.title.apply_to(title));
        println!(
            "  {}",
            self.title
                .apply_to("\u{2550}".repeat(title.chars().count()))
        );
        println!();
    }

    fn row(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14}{}", self.label.apply_to(label), self.value.apply_to(value));
    }

    fn method_row(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14}{}", self.label.apply_to(label), self.method.apply_to(value));
    }

    fn path_row(&self, label: &str, path: &Path) {
        println!("  {:<14}{}", self.label.apply_to(label), self.path.apply_to(path.display()));
    }

    fn output_row(&self, folder: Option<&Path>) {
        match folder {
            Some(f) => self.path_row("Output to", f),
            None => self.row("Output to", "input folder"),
        }
    }

    fn aux_row(&self, label: &str, aux: &AuxFileConfig) {
        if aux.fit_keys.is_empty() {
            self.row(label, &aux.pattern);
        } else {
            self.row(label, format!("{} (match {})", aux.pattern, aux.fit_keys.join(", ")));
        }
    }
}

fn print_inputs(s: &Styles, inputs: &[PathBuf]) {
    s.row("Inputs", inputs.len());
    if let Some(first) = inputs.first() {
        s.path_row("First", first);
    }
}

pub fn print_bias_summary(config: &MasterBiasConfig, inputs: &[PathBuf]) {
    let s = Styles::new();
    s.heading("Master Bias");
    print_inputs(&s, inputs);
    s.method_row("Combine", config.combine_method);
    s.method_row("Format", config.output_format);
    s.output_row(config.output_folder.as_deref());
    println!();
}

pub fn print_flat_summary(config: &MasterFlatConfig, inputs: &[PathBuf]) {
    let s = Styles::new();
    s.heading("Master Flat");
    print_inputs(&s, inputs);
    s.method_row("Combine", config.combine_method);
    s.method_row("Format", config.output_format);
    s.aux_row("Bias", &config.bias);
    s.aux_row("Dark", &config.dark);
    s.output_row(config.output_folder.as_deref());
    println!();
}

pub fn print_rgb_summary(config: &RgbConfig, inputs: &[PathBuf]) {
    let s = Styles::new();
    s.heading("RGB Composite");
    for (label, path) in ["Red", "Green", "Blue"].iter().zip(inputs) {
        s.path_row(label, path);
    }
    s.row(
        "Percentiles",
        format!("{} / {}", config.min_percentile, config.max_percentile),
    );
    s.method_row("Format", config.image_format);
    s.path_row("Font", &config.font_path);
    s.output_row(config.output_folder.as_deref());
    println!();
}

pub fn print_result(output: &StepOutput) {
    let s = Styles::new();
    s.path_row("Saved", &output.path);
    if let Some(ref cube) = output.cube {
        s.path_row("Cube", cube);
    }
    s.row("Frames used", output.frame_count);
}

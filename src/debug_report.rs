use declmark::{Report, VariantReport};

/// What a piece of report text is, mapped to an SGR code when color is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Title,
    Rule,
    Index,
    Declaration,
    Wrapper,
    Feature,
    Body,
    Active,
    Muted,
    Warning,
    Elapsed,
}

impl Role {
    fn sgr(self) -> &'static str {
        match self {
            Role::Title => "1;36",
            Role::Rule | Role::Index => "90",
            Role::Declaration => "1;32",
            Role::Wrapper | Role::Warning => "33",
            Role::Feature => "34",
            Role::Body | Role::Elapsed => "36",
            Role::Active => "32",
            Role::Muted => "2",
        }
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, s: impl AsRef<str>, role: Role) -> String {
        let s = s.as_ref();
        if self.enabled { format!("\x1b[{}m{s}\x1b[0m", role.sgr()) } else { s.to_string() }
    }

    fn rule(&self, title: &str) -> String {
        self.paint(format!("━━━ {title} ━━━"), Role::Rule)
    }
}

pub fn print_run(source: &str, report: &Report, color: bool) {
    let palette = Palette::new(color);
    println!("\n{}", palette.paint(format!("⚙  Resolving: {source}"), Role::Title));

    println!("\n{}", palette.rule("Variants"));
    if report.variants.is_empty() {
        println!("{}", palette.paint("  No feature applies to any variant", Role::Muted));
        println!("\n{}", palette.paint("  Tip: pass --all to list disabled matches as well", Role::Muted));
    } else {
        for (idx, variant) in report.variants.iter().enumerate() {
            println!("{}", variant_header(idx, variant, &palette));
            print_features(variant, &palette);
        }
    }

    if !report.diagnostics.is_empty() {
        println!("\n{}", palette.rule("Diagnostics"));
        for diagnostic in &report.diagnostics {
            println!("  {} {}", palette.paint("warning:", Role::Warning), diagnostic);
        }
    }

    println!("\n{}", palette.rule("Timing"));
    let metrics = &report.metrics;
    println!(
        "  Total: {}  │  Expand: {}  │  Resolve: {}  │  {} variants, {} queries",
        palette.paint(format!("{:?}", metrics.total), Role::Active),
        palette.paint(format!("{:?}", metrics.expand), Role::Elapsed),
        palette.paint(format!("{:?}", metrics.resolve), Role::Muted),
        metrics.variants,
        metrics.queries,
    );
    println!();
}

fn variant_header(idx: usize, variant: &VariantReport, palette: &Palette) -> String {
    let reduced = if variant.reduced { palette.paint(" (default args)", Role::Muted) } else { String::new() };
    format!(
        "  {} {}{} {} {}",
        palette.paint(format!("[{idx}]"), Role::Index),
        palette.paint(&variant.decl, Role::Declaration),
        reduced,
        palette.paint("│", Role::Muted),
        palette.paint(&variant.wrapper_name, Role::Wrapper),
    )
}

fn print_features(variant: &VariantReport, palette: &Palette) {
    for feature in &variant.features {
        let state = if feature.resolved.active {
            palette.paint("✓", Role::Active)
        } else {
            palette.paint("✗", Role::Muted)
        };
        println!("      {} {}", state, palette.paint(&feature.name, Role::Feature));

        for (key, value) in &feature.resolved.attributes {
            println!("        {} {}", palette.paint(format!("{key}="), Role::Muted), value);
        }
        if let Some(body) = &feature.resolved.body {
            for line in body.lines() {
                println!("        {}", palette.paint(line, Role::Body));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declmark::{Interface, Options, ReportOptions};

    #[test]
    fn disabled_palette_leaves_text_plain() {
        let palette = Palette::new(false);
        assert_eq!(palette.paint("ok", Role::Active), "ok");
        assert_eq!(palette.rule("Timing"), "━━━ Timing ━━━");
    }

    #[test]
    fn enabled_palette_wraps_text_in_role_codes() {
        let palette = Palette::new(true);
        assert_eq!(palette.paint("ok", Role::Active), "\x1b[32mok\x1b[0m");
        assert_eq!(palette.paint("Factory::make", Role::Declaration), "\x1b[1;32mFactory::make\x1b[0m");
    }

    #[test]
    fn variant_header_names_wrapper_and_reduced_arity() {
        let iface = Interface::from_script(
            "%feature(\"except\") %{ guard(); %}\nfunction hello(int i = 0);",
            Options::default(),
        )
        .unwrap();
        let report = iface.report(&ReportOptions::default());
        let headers: Vec<String> =
            report.variants.iter().enumerate().map(|(i, v)| variant_header(i, v, &Palette::new(false))).collect();

        assert_eq!(headers.len(), 2);
        assert!(headers[0].starts_with("  [0] hello"), "{}", headers[0]);
        assert!(!headers[0].contains("(default args)"));
        assert!(headers[1].contains("(default args)"), "{}", headers[1]);
        assert!(headers[1].ends_with(&report.variants[1].wrapper_name));
    }
}

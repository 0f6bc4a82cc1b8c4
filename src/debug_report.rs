use colloquy::{ReplySource, TurnTrace};

mod ansi {
    pub const BOLD: &str = "1";
    pub const DIM: &str = "2";
    pub const RED: &str = "31";
    pub const GREEN: &str = "32";
    pub const YELLOW: &str = "33";
    pub const BLUE: &str = "34";
    pub const CYAN: &str = "36";
    pub const GRAY: &str = "90";

    /// SGR styling that collapses to plain text when color is off.
    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, code: &str) -> String {
            match self.enabled {
                true => format!("\x1b[{code}m{}\x1b[0m", s.as_ref()),
                false => s.as_ref().to_string(),
            }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.paint(s, BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.paint(s, DIM)
        }
    }
}

pub fn print_turn(input: &str, trace: &TurnTrace, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Turn: \"{}\"", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Words ━━━", ansi::GRAY));
    if trace.words.is_empty() {
        println!("{}", palette.dim("  (none)"));
    } else {
        println!("  {}", trace.words.join(" "));
    }

    println!("\n{}", palette.paint("━━━ Keys ━━━", ansi::GRAY));
    if trace.keys.is_empty() {
        println!("{}", palette.dim("  No key triggered"));
    }
    for (word, weight) in &trace.keys {
        println!("  {} {}", palette.paint(word, ansi::BLUE), palette.dim(format!("weight {weight}")));
    }

    if !trace.attempts.is_empty() {
        println!("\n{}", palette.paint("━━━ Decompositions ━━━", ansi::GRAY));
        print_attempts(trace, &palette);
    }

    if !trace.gotos.is_empty() {
        println!("\n{}", palette.paint("━━━ Goto ━━━", ansi::GRAY));
        for (from, to) in &trace.gotos {
            println!("  {} → {}", palette.paint(from, ansi::BLUE), palette.paint(to, ansi::BLUE));
        }
    }

    println!("\n{}", palette.paint("━━━ Memory ━━━", ansi::GRAY));
    for saved in &trace.saved {
        println!("  {} {}", palette.paint("+", ansi::GREEN), saved.join(" "));
    }
    println!("  {}", palette.dim(format!("{} item(s) held", trace.memory_len)));

    println!("\n{}", palette.paint("━━━ Reply ━━━", ansi::GRAY));
    println!(
        "  Source: {}  │  Time: {}",
        match &trace.source {
            Some(source) => palette.bold(fmt_source(source)),
            None => palette.paint("error", ansi::RED),
        },
        palette.paint(format!("{:?}", trace.elapsed), ansi::GREEN),
    );
    println!();
}

fn print_attempts(trace: &TurnTrace, palette: &ansi::Palette) {
    for attempt in &trace.attempts {
        let outcome = if attempt.matched {
            palette.paint("✓ matched", ansi::GREEN)
        } else {
            palette.dim("✗ no match")
        };
        println!(
            "  {} {} {}",
            palette.paint(&attempt.key, ansi::BLUE),
            palette.paint(format!("#{}", attempt.decomp), ansi::YELLOW),
            outcome
        );
    }
}

fn fmt_source(source: &ReplySource) -> String {
    match source {
        ReplySource::Key(key) => format!("key '{key}'"),
        ReplySource::Entity(key) => format!("entity key '{key}'"),
        ReplySource::Sentiment(sentiment) => format!("sentiment '{}'", sentiment.as_str()),
        ReplySource::Capability { key, name } => format!("capability '{name}' under '{key}'"),
        ReplySource::Memory => "memory".to_string(),
        ReplySource::Default => "default key".to_string(),
        ReplySource::Quit => "quit".to_string(),
    }
}

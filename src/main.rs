use clap::Parser;
use tracing_subscriber::EnvFilter;

use textmask::TextFormatter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mask pattern (restricted regex subset)
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Input text to reformat through the mask
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Print the placeholder hint string
    #[arg(short, long)]
    placeholder: bool,

    /// Print the replacement template
    #[arg(short, long)]
    template: bool,

    /// Use a custom replacement template ($k markers, $$ for a literal $)
    #[arg(long, value_name = "TEMPLATE")]
    replace: Option<String>,

    /// Open an interactive masked field
    #[arg(short, long)]
    interactive: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let formatter = match &args.replace {
        Some(template) => TextFormatter::with_template(&args.pattern, template)
            .unwrap_or_else(|err| fail(&err.to_string())),
        None => {
            TextFormatter::new(&args.pattern).unwrap_or_else(|err| fail(&err.to_string()))
        }
    };

    if args.placeholder {
        println!("{}", formatter.placeholder());
    }
    if args.template {
        println!("{}", formatter.replacement_template());
    }

    if args.interactive {
        match textmask::tui::run(&formatter) {
            Ok(Some(text)) => println!("{text}"),
            Ok(None) => std::process::exit(1),
            Err(err) => fail(&format!("{err}")),
        }
        return;
    }

    if let Some(input) = &args.input {
        match formatter.format_text(input) {
            Ok(formatted) => println!("{formatted}"),
            Err(err) => fail(&err.to_string()),
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

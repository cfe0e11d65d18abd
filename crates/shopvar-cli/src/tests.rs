use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["shopvar"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_build_with_required_paths() {
    let cli = Cli::try_parse_from([
        "shopvar",
        "build",
        "--input",
        "products.csv",
        "--output",
        "out/shopify.csv",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Build {
            ref input,
            ref output,
            report: None,
            edits: None,
            settings: None,
            ai_mode: None,
        }) if input == &PathBuf::from("products.csv") && output == &PathBuf::from("out/shopify.csv")
    ));
}

#[test]
fn parses_build_with_all_options() {
    let cli = Cli::try_parse_from([
        "shopvar",
        "build",
        "-i",
        "in.csv",
        "-o",
        "out.csv",
        "--report",
        "report.json",
        "--edits",
        "edits.yaml",
        "--settings",
        "settings.yaml",
        "--ai-mode",
        "full",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Build {
            report: Some(_),
            edits: Some(_),
            settings: Some(_),
            ai_mode: Some(AiMode::Full),
            ..
        })
    ));
}

#[test]
fn build_requires_output() {
    let result = Cli::try_parse_from(["shopvar", "build", "--input", "in.csv"]);
    assert!(result.is_err());
}

#[test]
fn rejects_unknown_ai_mode() {
    let result = Cli::try_parse_from([
        "shopvar", "build", "-i", "in.csv", "-o", "out.csv", "--ai-mode", "turbo",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_validate_command() {
    let cli = Cli::try_parse_from(["shopvar", "validate", "--input", "in.csv"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Validate {
            report: None,
            settings: None,
            ..
        })
    ));
}

#[test]
fn parses_sizes_tokens() {
    let cli = Cli::try_parse_from(["shopvar", "sizes", "L-2,S-4", "M"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Sizes { ref tokens, settings: None }) if tokens.len() == 2
    ));
}

#[test]
fn sizes_requires_tokens() {
    let result = Cli::try_parse_from(["shopvar", "sizes"]);
    assert!(result.is_err());
}

use clap::Args;

const SUPPORTED_LANGUAGES: [(&str, &str); 3] = [("en", "Hello"), ("es", "Hola"), ("fr", "Bonjour")];

/// Arguments for the greet command.
#[derive(Args, Debug)]
pub struct GreetArgs {
    /// Name to greet
    #[arg(long, default_value = "world")]
    pub name: String,

    /// Language code for the greeting
    #[arg(long, default_value = "en", value_parser = ["en", "es", "fr"])]
    pub lang: String,
}

impl Default for GreetArgs {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Builds a greeting; blank names become "world", unknown languages English.
#[must_use]
pub fn build_greeting(name: &str, language: &str) -> String {
    let name = match name.trim() {
        "" => "world",
        trimmed => trimmed,
    };
    let language = language.trim().to_lowercase();
    let salutation = SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| *code == language)
        .map_or("Hello", |(_, salutation)| *salutation);

    format!("{salutation}, {name}!")
}

pub fn run_greet(args: &GreetArgs) {
    println!("{}", build_greeting(&args.name, &args.lang));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_languages() {
        assert_eq!(build_greeting("Ada", "en"), "Hello, Ada!");
        assert_eq!(build_greeting("Ada", "es"), "Hola, Ada!");
        assert_eq!(build_greeting("Ada", " FR "), "Bonjour, Ada!");
    }

    #[test]
    fn test_blank_name_and_unknown_language() {
        assert_eq!(build_greeting("   ", "de"), "Hello, world!");
        assert_eq!(build_greeting("Ada", ""), "Hello, Ada!");
    }
}

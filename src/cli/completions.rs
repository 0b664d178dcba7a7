use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "Load completions for the current session:\n  \
                  eval \"$(srcfetch completions bash)\"\n\n\
                  Or install them permanently, e.g. for fish:\n  \
                  srcfetch completions fish > ~/.config/fish/completions/srcfetch.fish")]
pub struct CompletionsArgs {
    /// Target shell: bash, elvish, fish, powershell (pwsh) or zsh
    #[arg(value_name = "SHELL")]
    pub shell: String,
}

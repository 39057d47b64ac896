use clap::Parser;

/// A small terminal multiplexer. Ctrl-A prefixes commands: `c` opens a
/// window, `n`/`N` cycle focus, `"` lists windows.
#[derive(Parser, Debug)]
#[command(name = "smux", version, about)]
pub struct Cli {
    /// Shell to run in new windows (overrides config and $SHELL)
    #[arg(long)]
    pub shell: Option<String>,

    /// Per-window scrollback capacity in bytes
    #[arg(long)]
    pub scrollback_bytes: Option<usize>,
}

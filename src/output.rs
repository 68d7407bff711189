//! CLI output formatting.

pub fn debug_enabled() -> bool {
    std::env::var_os("CHROMADESK_DEBUG").is_some_and(|v| !v.is_empty())
}

/// One line by default; with `debug`, every cause on its own line.
pub fn format_error(err: &anyhow::Error, debug: bool) -> String {
    let mut out = format!("error: {err}");
    if debug {
        for cause in err.chain().skip(1) {
            out.push_str(&format!("\n  caused by: {cause}"));
        }
    }
    out
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}", format_error(err, debug_enabled()));
}

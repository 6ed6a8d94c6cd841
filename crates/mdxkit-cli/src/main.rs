use std::process::ExitCode;

fn main() -> ExitCode {
    mdxkit_cli::run()
}

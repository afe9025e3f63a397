//! ASCII banner for interactive `run` sessions.

use std::io::IsTerminal;

struct Colors {
    frame: &'static str,
    tick: &'static str,
    title: &'static str,
    subtitle: &'static str,
    reset: &'static str,
}

const COLOR: Colors = Colors {
    frame: "\x1b[38;2;90;140;120m",
    tick: "\x1b[38;2;220;180;90m",
    title: "\x1b[1;38;2;200;210;220m",
    subtitle: "\x1b[38;2;110;110;130m",
    reset: "\x1b[0m",
};

const PLAIN: Colors = Colors { frame: "", tick: "", title: "", subtitle: "", reset: "" };

/// Prints the startup banner to stdout, ANSI color when stdout is a
/// terminal, plain text otherwise.
pub fn print_banner(component: &str) {
    let c = if std::io::stdout().is_terminal() { &COLOR } else { &PLAIN };
    let fr = c.frame;
    let tk = c.tick;
    let tt = c.title;
    let st = c.subtitle;
    let r = c.reset;

    println!(
        r#"
{fr}┌─────────────────┐{r}
{fr}│ {tk}●{r} {fr}┊{r} {tk}●{r} {fr}┊{r} {tk}●{r}     {r}{fr}│{r}   {tt}edgelord{r} / {tt}{component}{r}
{fr}└─────────────────┘{r}  {st}cross-market sports prediction trading{r}
"#
    );
}

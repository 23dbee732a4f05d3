use std::fmt;

/// Two-character marker expanded token-wide to the shell's own pid.
const EXPANSION_MARKER: &str = "$$";

/// Direction of an I/O redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
    Input,
    Output,
}

/// Represents one fully parsed command line.
#[derive(Debug)]
pub struct ParsedCommand {
    /// Command name; never empty after a successful parse.
    pub program: String,
    /// Positional arguments, in input order. Does not include the program
    /// name, redirection operators and their filenames, or the trailing `&`.
    pub arguments: Vec<String>,
    /// Redirections in input order; a later entry for the same stream
    /// overrides an earlier one when applied.
    pub redirections: Vec<(RedirKind, String)>,
    /// Run without waiting. Forced false while foreground-only mode is on.
    pub background: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The line held no command token (e.g. a lone `&`).
    EmptyCommand,
    /// A redirection operator with no following filename token.
    MissingRedirectTarget(RedirKind),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyCommand => write!(f, "no command given"),
            ParseError::MissingRedirectTarget(RedirKind::Input) => {
                write!(f, "no input file specified after `<`")
            }
            ParseError::MissingRedirectTarget(RedirKind::Output) => {
                write!(f, "no output file specified after `>`")
            }
        }
    }
}

/// Splits `cmdline` into whitespace-delimited tokens, expanding every
/// occurrence of `$$` inside each token to `pid`. Bytes around each match
/// are preserved; tokens without the marker pass through unchanged.
pub fn tokenize(cmdline: &str, pid: &str) -> Vec<String> {
    cmdline
        .split_whitespace()
        .map(|token| expand_token(token, pid))
        .collect()
}

fn expand_token(token: &str, pid: &str) -> String {
    if token.contains(EXPANSION_MARKER) {
        token.replace(EXPANSION_MARKER, pid)
    } else {
        token.to_string()
    }
}

/// Consumes the token sequence positionally and builds a `ParsedCommand`:
///
/// - Token 0 is the program name.
/// - `<` and `>` each consume exactly the next token as a redirection path;
///   a trailing operator with no path is an error, not a silent drop.
/// - A standalone trailing `&` marks the command for background execution
///   unless `fg_only` is set, in which case the marker is still consumed
///   but the command stays foreground.
/// - Every other token is a positional argument.
pub fn parse(mut tokens: Vec<String>, fg_only: bool) -> Result<ParsedCommand, ParseError> {
    let mut background = false;
    if tokens.last().map(String::as_str) == Some("&") {
        tokens.pop();
        background = !fg_only;
    }

    let mut iter = tokens.into_iter();
    let program = iter.next().ok_or(ParseError::EmptyCommand)?;

    let mut arguments = Vec::new();
    let mut redirections = Vec::new();
    while let Some(token) = iter.next() {
        match token.as_str() {
            "<" => {
                let path = iter
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget(RedirKind::Input))?;
                redirections.push((RedirKind::Input, path));
            }
            ">" => {
                let path = iter
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget(RedirKind::Output))?;
                redirections.push((RedirKind::Output, path));
            }
            _ => arguments.push(token),
        }
    }

    Ok(ParsedCommand {
        program,
        arguments,
        redirections,
        background,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_line(line: &str, fg_only: bool) -> Result<ParsedCommand, ParseError> {
        parse(tokenize(line, "777"), fg_only)
    }

    #[test]
    fn test_tokenize_simple() {
        let tokens = tokenize("ls -l /tmp\n", "777");
        assert_eq!(tokens, vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_expand_no_marker_unchanged() {
        assert_eq!(expand_token("hello", "777"), "hello");
        assert_eq!(expand_token("$HOME", "777"), "$HOME");
    }

    #[test]
    fn test_expand_single_marker() {
        let tokens = tokenize("echo pre$$post", "777");
        assert_eq!(tokens, vec!["echo", "pre777post"]);
    }

    #[test]
    fn test_expand_every_occurrence_in_token() {
        assert_eq!(expand_token("$$x$$", "42"), "42x42");
        assert_eq!(expand_token("$$$$", "42"), "4242");
    }

    #[test]
    fn test_parse_plain_command() {
        let cmd = parse_line("cat -n file.txt\n", false).unwrap();
        assert_eq!(cmd.program, "cat");
        assert_eq!(cmd.arguments, vec!["-n", "file.txt"]);
        assert!(cmd.redirections.is_empty());
        assert!(!cmd.background);
    }

    #[test]
    fn test_parse_redirections_in_order() {
        let cmd = parse_line("cmd a > out.txt b < in.txt", false).unwrap();
        assert_eq!(cmd.program, "cmd");
        assert_eq!(cmd.arguments, vec!["a", "b"]);
        assert_eq!(
            cmd.redirections,
            vec![
                (RedirKind::Output, "out.txt".to_string()),
                (RedirKind::Input, "in.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_background_marker() {
        let cmd = parse_line("ls -l &", false).unwrap();
        assert!(cmd.background);
        assert_eq!(cmd.arguments, vec!["-l"]);
    }

    #[test]
    fn test_foreground_only_mode_forces_foreground() {
        let cmd = parse_line("ls -l &", true).unwrap();
        assert!(!cmd.background);
        assert_eq!(cmd.arguments, vec!["-l"]);
    }

    #[test]
    fn test_ampersand_only_special_when_trailing() {
        let cmd = parse_line("echo & hi", false).unwrap();
        assert!(!cmd.background);
        assert_eq!(cmd.arguments, vec!["&", "hi"]);
    }

    #[test]
    fn test_dangling_output_redirect() {
        let err = parse_line("echo hi >", false).unwrap_err();
        assert_eq!(err, ParseError::MissingRedirectTarget(RedirKind::Output));
    }

    #[test]
    fn test_dangling_input_redirect() {
        let err = parse_line("wc <", false).unwrap_err();
        assert_eq!(err, ParseError::MissingRedirectTarget(RedirKind::Input));
    }

    #[test]
    fn test_lone_ampersand_is_empty_command() {
        let err = parse_line("&", false).unwrap_err();
        assert_eq!(err, ParseError::EmptyCommand);
    }

    #[test]
    fn test_background_after_redirection() {
        let cmd = parse_line("sort < in.txt > out.txt &", false).unwrap();
        assert!(cmd.background);
        assert!(cmd.arguments.is_empty());
        assert_eq!(cmd.redirections.len(), 2);
    }
}

//! Parsing of REPL input into commands.

use hext_core::config::GenerationMode;
use std::path::PathBuf;
use std::str::FromStr;

/// Words that end the session.
pub const QUIT_WORDS: &[&str] = &["salir", "quit", "exit"];

/// Slash commands offered by completion, with their help text.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/nuevo", "Empieza una conversación nueva"),
    ("/chats", "Lista las conversaciones (la más reciente primero)"),
    ("/abrir", "/abrir <n>: vuelve a la conversación número n"),
    ("/modo", "/modo texto|imagen: cambia qué genera tu próximo mensaje"),
    ("/imagen", "/imagen <ruta> [pregunta]: analiza una imagen"),
    ("/ayuda", "Muestra esta ayuda"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    /// 1-based position in the `/chats` listing
    Open(usize),
    /// `None` shows the current mode
    Mode(Option<GenerationMode>),
    Image {
        path: PathBuf,
        question: Option<String>,
    },
    Help,
    Quit,
    Prompt(String),
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();

    if QUIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
        return Command::Quit;
    }
    if !line.starts_with('/') {
        return Command::Prompt(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/nuevo" => Command::New,
        "/chats" => Command::List,
        "/ayuda" => Command::Help,
        "/abrir" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Command::Open(n),
            _ => Command::Invalid("Uso: /abrir <n> (ver /chats)".to_string()),
        },
        "/modo" if rest.is_empty() => Command::Mode(None),
        "/modo" => match GenerationMode::from_str(rest) {
            Ok(mode) => Command::Mode(Some(mode)),
            Err(_) => Command::Invalid(format!("Modo desconocido '{rest}'. Usa: texto o imagen")),
        },
        "/imagen" => match split_path(rest) {
            Some((path, question)) => Command::Image {
                path: PathBuf::from(path),
                question: Some(question.to_string()).filter(|q| !q.is_empty()),
            },
            None => Command::Invalid("Uso: /imagen <ruta> [pregunta]".to_string()),
        },
        other => Command::Invalid(format!("Comando desconocido '{other}'. Escribe /ayuda")),
    }
}

/// Splits `<path> [rest]`; a path containing spaces can be quoted.
fn split_path(input: &str) -> Option<(&str, &str)> {
    if input.is_empty() {
        return None;
    }

    for quote in ['"', '\''] {
        if let Some(stripped) = input.strip_prefix(quote) {
            let end = stripped.find(quote)?;
            let path = &stripped[..end];
            return (!path.is_empty()).then(|| (path, stripped[end + 1..].trim()));
        }
    }

    Some(match input.split_once(char::is_whitespace) {
        Some((path, rest)) => (path, rest.trim()),
        None => (input, ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_prompt() {
        assert_eq!(
            parse("  ¿Cuál es el clima en Managua?  "),
            Command::Prompt("¿Cuál es el clima en Managua?".to_string())
        );
    }

    #[test]
    fn test_quit_words() {
        assert_eq!(parse("salir"), Command::Quit);
        assert_eq!(parse("QUIT"), Command::Quit);
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/nuevo"), Command::New);
        assert_eq!(parse("/chats"), Command::List);
        assert_eq!(parse("/ayuda"), Command::Help);
        assert_eq!(parse("/abrir 2"), Command::Open(2));
        assert!(matches!(parse("/abrir 0"), Command::Invalid(_)));
        assert!(matches!(parse("/abrir"), Command::Invalid(_)));
        assert!(matches!(parse("/borrar"), Command::Invalid(_)));
    }

    #[test]
    fn test_mode_command() {
        assert_eq!(parse("/modo"), Command::Mode(None));
        assert_eq!(parse("/modo imagen"), Command::Mode(Some(GenerationMode::Image)));
        assert_eq!(parse("/modo Texto"), Command::Mode(Some(GenerationMode::Text)));
        assert!(matches!(parse("/modo video"), Command::Invalid(_)));
    }

    #[test]
    fn test_image_command() {
        assert_eq!(
            parse("/imagen fotos/tigre.jpg ¿Qué animal es?"),
            Command::Image {
                path: PathBuf::from("fotos/tigre.jpg"),
                question: Some("¿Qué animal es?".to_string()),
            }
        );
        assert_eq!(
            parse("/imagen \"mis fotos/gato.png\""),
            Command::Image {
                path: PathBuf::from("mis fotos/gato.png"),
                question: None,
            }
        );
        assert!(matches!(parse("/imagen"), Command::Invalid(_)));
        assert!(matches!(parse("/imagen \"sin cerrar.png"), Command::Invalid(_)));
    }
}

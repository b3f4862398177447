//! The read-eval-print loop.

use crate::commands::{self, Command};
use crate::helper::CliHelper;
use crate::render;
use anyhow::Result;
use hext_application::{AppContext, ChatUseCase, DeltaSink, TurnOutcome};
use hext_core::config::GenerationMode;
use hext_infrastructure::{ImageOutputDir, load_image};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;

pub async fn run(context: AppContext) -> Result<()> {
    let AppContext {
        use_case, images, ..
    } = context;

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    render::banner(use_case.mode().await);

    loop {
        let prompt = format!("{}> ", use_case.mode().await);
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                render::info("CTRL-C detectado. Escribe 'salir' para terminar.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                render::error(&format!("Error: {err:?}"));
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match commands::parse(&line) {
            Command::Quit => break,
            Command::Help => render::help(),
            Command::New => {
                use_case.new_conversation().await;
                render::info("Nueva conversación. Escribe tu primer mensaje.");
            }
            Command::List => {
                let list = use_case.conversations().await;
                let active = use_case.store().active_id().await;
                render::conversation_list(&list, active.as_deref());
            }
            Command::Open(n) => open(&use_case, n).await,
            Command::Mode(None) => {
                render::info(&format!("Modo actual: {}", use_case.mode().await));
            }
            Command::Mode(Some(mode)) => {
                use_case.set_mode(mode).await;
                render::info(&format!("Modo cambiado a {mode}."));
            }
            Command::Image { path, question } => {
                describe(&use_case, &path, question.as_deref()).await;
            }
            Command::Prompt(text) => prompt_turn(&use_case, &images, &text).await,
            Command::Invalid(message) => render::error(&message),
        }
    }

    render::info("¡Hasta luego!");
    Ok(())
}

async fn open(use_case: &ChatUseCase, n: usize) {
    let list = use_case.conversations().await;
    let Some(summary) = render::nth_newest(&list, n) else {
        render::error(&format!("No existe la conversación {n}. Usa /chats."));
        return;
    };

    match use_case.open_conversation(&summary.id).await {
        Ok(conversation) => render::conversation(&conversation),
        Err(err) => render::error(&err.to_string()),
    }
}

async fn prompt_turn(use_case: &ChatUseCase, images: &ImageOutputDir, text: &str) {
    if use_case.mode().await == GenerationMode::Image {
        render::thinking();
        match use_case.generate_image(text).await {
            Ok(outcome) => show_image_outcome(images, &outcome).await,
            Err(err) => render::error(&err.to_string()),
        }
        return;
    }

    let result = with_printer(|sink| async move { use_case.send_message(text, Some(&sink)).await }).await;
    finish_text_turn(result);
}

async fn describe(use_case: &ChatUseCase, path: &Path, question: Option<&str>) {
    let image = match load_image(path).await {
        Ok(image) => image,
        Err(err) => {
            render::error(&format!("❌ Error al procesar la imagen: {err}"));
            return;
        }
    };

    render::user_line(&format!(
        "📷 {}{}",
        image.file_name,
        question.map(|q| format!(" · {q}")).unwrap_or_default()
    ));

    let result = with_printer(|sink| async move {
        use_case
            .describe_image(image.bytes, &image.mime_type, question, Some(&sink))
            .await
    })
    .await;
    finish_text_turn(result);
}

/// Runs a turn while a background task prints its deltas as they arrive.
async fn with_printer<F, Fut>(turn: F) -> hext_core::Result<TurnOutcome>
where
    F: FnOnce(DeltaSink) -> Fut,
    Fut: std::future::Future<Output = hext_core::Result<TurnOutcome>>,
{
    render::thinking();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(delta) = rx.recv().await {
            render::assistant_delta(&delta);
            let _ = std::io::stdout().flush();
        }
        println!();
    });

    // The sink is moved into the turn and dropped with it, which ends the printer.
    let result = turn(tx).await;
    let _ = printer.await;
    result
}

fn finish_text_turn(result: hext_core::Result<TurnOutcome>) {
    match result {
        Ok(outcome) => {
            render::sources(&outcome.reply.sources);
            if let Some(err) = &outcome.error {
                tracing::debug!("[Repl] Turn ended with error: {}", err);
            }
        }
        Err(err) => render::error(&err.to_string()),
    }
}

async fn show_image_outcome(images: &ImageOutputDir, outcome: &TurnOutcome) {
    render::assistant_text(&outcome.reply.content);

    let Some(bytes) = outcome.reply.image.as_deref() else {
        return;
    };
    match images.save(bytes).await {
        Ok(path) => render::saved_image(&path),
        Err(err) => render::error(&format!("No se pudo guardar la imagen: {err}")),
    }
}

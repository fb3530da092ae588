use consulta_core::api::{handle_diagnose, handle_train, Reply};
use consulta_core::provider::{CatalogProvider, JsonCatalogProvider};
use consulta_core::{DiagnosisEngine, DiagnosisError, EngineConfig};
use log::{debug, error, info, warn};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

// Line protocol on stdin/stdout, one request per line:
//   DIAGNOSTICAR {"sintomas": "...", "edad": 30, "genero": "femenino"}
//   ENTRENAR {"sintomas": "...", "diagnostico": "..."}
//   SINTOMAS
//   EXIT
// Every reply is "<status> <json>".

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let engine = match DiagnosisEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Could not start the diagnosis engine: {e}");
            return ExitCode::FAILURE;
        }
    };
    let catalog = JsonCatalogProvider::new(&config.catalog_path);

    match serve(&engine, &catalog) {
        Ok(()) => {
            info!("Shutting down.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("I/O failure: {e}");
            ExitCode::FAILURE
        }
    }
}

fn serve(engine: &DiagnosisEngine, catalog: &dyn CatalogProvider) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        debug!("<- {input:?}");
        let (command, body) = match input.trim().split_once(' ') {
            Some((command, body)) => (command, body.trim()),
            None => (input.trim(), ""),
        };

        let reply = match command {
            "" => continue,
            "DIAGNOSTICAR" => handle_diagnose(engine, body),
            "ENTRENAR" => handle_train(engine, body),
            "SINTOMAS" => list_symptoms(catalog),
            "EXIT" => break,
            other => {
                warn!("Unknown command '{other}'");
                DiagnosisError::validation(format!("Comando desconocido: {other}")).into()
            }
        };
        write_reply(&mut stdout, &reply)?;
    }
    Ok(())
}

fn list_symptoms(catalog: &dyn CatalogProvider) -> Reply {
    match catalog.load_symptom_vocabulary() {
        Ok(vocabulary) => Reply {
            status: 200,
            body: json!({ "sintomas": vocabulary.sorted() }),
        },
        Err(e) => DiagnosisError::from(e).into(),
    }
}

fn write_reply(stdout: &mut io::Stdout, reply: &Reply) -> io::Result<()> {
    let line = format!("{} {}", reply.status, reply.body);
    debug!("-> {line:?}");
    writeln!(stdout, "{line}")?;
    stdout.flush()
}

use consulta_core::{DiagnosisEngine, DiagnosisResult, EngineConfig, StrategyKind, UserQuery};
use crossterm::style::Stylize;
use std::io::{stdin, stdout, Write};

struct Session {
    strategy: StrategyKind,
    age: Option<u32>,
    gender: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            return;
        }
    };
    let engine = match DiagnosisEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("[ERROR] Could not start the diagnosis engine: {e}");
            return;
        }
    };
    let mut session = Session {
        strategy: engine.default_strategy(),
        age: None,
        gender: None,
    };

    println!("{}", "Consulta médica (consola). Escribe 'salir' para terminar.".bold());
    println!("---------------------------------------------------------------");
    print_help();

    loop {
        print_prompt(&session);
        let mut input = String::new();
        match stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("[ERROR] {e}");
                break;
            }
        }
        let cmd = input.trim();

        match cmd {
            "salir" | "exit" => break,
            "" => {}
            ":ayuda" => print_help(),
            ":reglas" => session.strategy = StrategyKind::RuleBased,
            ":bayes" => session.strategy = StrategyKind::Probabilistic,
            s if s.starts_with(":edad ") => match s[":edad ".len()..].trim().parse::<u32>() {
                Ok(age) => session.age = Some(age),
                Err(_) => println!("{}", "Edad inválida".red()),
            },
            s if s.starts_with(":genero ") => {
                session.gender = Some(s[":genero ".len()..].trim().to_string());
            }
            s if s.starts_with(":entrenar ") => {
                // :entrenar <diagnostico> = <sintomas>
                match s[":entrenar ".len()..].split_once('=') {
                    Some((label, symptoms)) => match engine.train(symptoms.trim(), label.trim()) {
                        Ok(()) => println!("{}", "Modelo actualizado.".green()),
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    None => println!("{}", "Uso: :entrenar <diagnóstico> = <síntomas>".yellow()),
                }
            }
            symptoms => {
                let query = UserQuery {
                    symptoms: symptoms.to_string(),
                    age: session.age,
                    gender: session.gender.clone(),
                };
                match engine.diagnose_with(&query, session.strategy) {
                    Ok(result) => print_result(&result),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
        }
    }
}

fn print_help() {
    println!("Escribe los síntomas separados por comas para obtener un diagnóstico.");
    println!("  :edad <n>          fija la edad del paciente");
    println!("  :genero <g>        fija el género del paciente");
    println!("  :reglas | :bayes   cambia la estrategia");
    println!("  :entrenar <diagnóstico> = <síntomas>");
}

fn print_prompt(session: &Session) {
    let age = session.age.map_or("-".to_string(), |a| a.to_string());
    let gender = session.gender.as_deref().unwrap_or("-");
    print!(
        "\n[{} | edad {} | género {}] > ",
        session.strategy.to_string().cyan(),
        age,
        gender
    );
    // A failed flush only delays the prompt.
    let _ = stdout().flush();
}

fn print_result(result: &DiagnosisResult) {
    println!("{} {}", "Diagnóstico:".bold(), result.diagnosis.as_str().green());
    println!("{} {}", "Tratamiento:".bold(), result.treatment);
    if let Some(description) = &result.description {
        println!("{} {}", "Descripción:".bold(), description);
    }
}

mod config;

use admissions_workflow::{AdmissionsService, WorkflowError};
use config::AppConfig;
use flow::Payload;
use serde_json::Value as JsonValue;
use std::error::Error;
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pequeño menú interactivo sobre el motor de admisiones en memoria.
///
/// Opciones soportadas:
/// 1) Ver flujo (pasos y tareas)
/// 2) Crear usuario
/// 3) Ver usuarios
/// 4) Completar tarea (payload JSON)
/// 5) Ver posición actual y progreso
/// 6) Ver estado
/// 7) Salir
fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&config.log_filter))
                                  .with(tracing_subscriber::fmt::layer())
                                  .init();

    // Una definición inválida aborta el arranque.
    let flow = config.load_flow().map_err(|e| {
                                     tracing::error!("Definición de flujo inválida: {}", e);
                                     e
                                 })?;
    tracing::info!("Flujo '{}' cargado con {} tareas", flow.id(), flow.task_count());
    let service = AdmissionsService::in_memory(flow);

    loop {
        println!("\n== Admissions CLI menu ==");
        println!("1) Ver flujo");
        println!("2) Crear usuario");
        println!("3) Ver usuarios");
        println!("4) Completar tarea");
        println!("5) Ver posición actual y progreso");
        println!("6) Ver estado");
        println!("7) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        if io::stdin().read_line(&mut choice)? == 0 {
            break;
        }
        match choice.trim() {
            "1" => {
                let user_id = prompt("Id de usuario (enter para ver el flujo completo): ")?;
                if user_id.trim().is_empty() {
                    print_flow(&service);
                } else {
                    match service.visible_steps(user_id.trim()) {
                        Ok(steps) => {
                            for vs in steps {
                                println!("{}. {} [{}]", vs.index + 1, vs.step.name(), vs.step.id());
                                if vs.step.has_implicit_task() {
                                    println!("   - (tarea implícita)");
                                }
                                for t in vs.tasks {
                                    println!("   - {} [{}]", t.name(), t.id());
                                }
                            }
                        }
                        Err(e) => report(&e),
                    }
                }
            }
            "2" => {
                let input = prompt("Email: ")?;
                let email = match parse_email(&input) {
                    Some(e) => e,
                    None => {
                        eprintln!("Email inválido: no puede estar vacío");
                        continue;
                    }
                };
                match service.create_user(email) {
                    Ok(user) => println!("Usuario creado: {} ({})", user.id(), user.email()),
                    Err(e) => report(&e),
                }
            }
            "3" => match service.list_users() {
                Ok(users) => {
                    println!("\nID     | EMAIL                                  | TAREAS");
                    println!("---------------------------------------------------------------");
                    for u in users {
                        println!("{:<6} | {:<38} | {}", u.id(), u.email(), u.completed_tasks().len());
                    }
                }
                Err(e) => report(&e),
            },
            "4" => {
                let user_id = prompt("Id de usuario: ")?;
                let task = prompt("Tarea (id o nombre): ")?;
                let payload_s = prompt("Payload (objeto JSON): ")?;
                let payload = match parse_payload(&payload_s) {
                    Some(p) => p,
                    None => {
                        eprintln!("Payload inválido: se esperaba un objeto JSON");
                        continue;
                    }
                };
                match service.complete_task(user_id.trim(), task.trim(), payload) {
                    Ok(outcome) => print_json(&outcome),
                    Err(e) => report(&e),
                }
            }
            "5" => {
                let user_id = prompt("Id de usuario: ")?;
                match service.progress(user_id.trim()) {
                    Ok(summary) => print_json(&summary),
                    Err(e) => report(&e),
                }
            }
            "6" => {
                let user_id = prompt("Id de usuario: ")?;
                match service.user_status(user_id.trim()) {
                    Ok(status) => println!("Estado: {}", status),
                    Err(e) => report(&e),
                }
            }
            "7" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn print_flow(service: &AdmissionsService) {
    let flow = service.flow();
    println!("\n{} [{}]", flow.name(), flow.id());
    for (i, step) in service.ordered_steps().iter().enumerate() {
        println!("{}. {} [{}]", i + 1, step.name(), step.id());
        if step.has_implicit_task() {
            println!("   - (tarea implícita)");
        }
        for t in step.tasks() {
            let fields: Vec<&str> = t.required_fields().iter().map(String::as_str).collect();
            println!("   - {} [{}] campos: [{}]{}",
                     t.name(),
                     t.id(),
                     fields.join(", "),
                     if t.is_redoable() { "" } else { " (no rehacible)" });
        }
    }
}

/// Muestra el mensaje público del error; los internos además se registran
/// con su detalle.
fn report(e: &WorkflowError) {
    if e.is_recoverable() {
        tracing::debug!("Error de petición: {:?}", e.kind());
    } else {
        tracing::error!("Error interno: {}", e);
    }
    eprintln!("Error: {}", e.public_message());
}

/// Email tal como se escribió, sin el salto de línea final. `None` si está
/// en blanco.
fn parse_email(input: &str) -> Option<&str> {
    let email = input.trim_end_matches(['\n', '\r']);
    if email.trim().is_empty() {
        None
    } else {
        Some(email)
    }
}

fn parse_payload(input: &str) -> Option<Payload> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(Payload::new());
    }
    match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => tracing::error!("No se pudo serializar la respuesta: {}", e),
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

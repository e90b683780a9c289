// Logs in, opens the employer event stream for a job, and prints incoming
// SmartBot events until Ctrl-C.
//
// Required env vars (a .env file works too):
//   JOBBOARD_API_URL, JOBBOARD_WS_URL, JOBBOARD_EMAIL, JOBBOARD_PASSWORD,
//   JOBBOARD_JOB_ID

use jobboard_connector_rs::auth::TokenStore;
use jobboard_connector_rs::rest::Client;
use jobboard_connector_rs::types::LoginRequest;
use jobboard_connector_rs::websocket::{ConnectionConfig, ConnectionManager};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let base_url = std::env::var("JOBBOARD_API_URL").expect("JOBBOARD_API_URL not set");
    let ws_url = std::env::var("JOBBOARD_WS_URL").expect("JOBBOARD_WS_URL not set");
    let email = std::env::var("JOBBOARD_EMAIL").expect("JOBBOARD_EMAIL not set");
    let password = std::env::var("JOBBOARD_PASSWORD").expect("JOBBOARD_PASSWORD not set");
    let job_id = std::env::var("JOBBOARD_JOB_ID").expect("JOBBOARD_JOB_ID not set");

    let tokens = TokenStore::new();
    let client = Client::new(&base_url, tokens.clone(), None).expect("Failed to create client");
    client
        .login(&LoginRequest {
            email: &email,
            password: &password,
        })
        .await
        .expect("Login failed");

    let manager = ConnectionManager::new(ConnectionConfig::new(ws_url).with_job(job_id), tokens);
    manager.set_on_message(|msg| {
        println!(
            "[{}] {}: {}",
            msg.timestamp.as_deref().unwrap_or("-"),
            msg.kind,
            msg.data
        );
    });
    manager.set_on_connect(|| println!("connected"));
    manager.set_on_disconnect(|| println!("disconnected"));
    manager.set_on_error(|err| eprintln!("stream error: {}", err));

    manager.connect().await;

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");
    manager.disconnect().await;
    println!("bye");
}

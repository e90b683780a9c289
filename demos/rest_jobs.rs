// Logs in with credentials from the environment and lists job postings.
//
// Required env vars (a .env file works too):
//   JOBBOARD_API_URL, JOBBOARD_EMAIL, JOBBOARD_PASSWORD

use jobboard_connector_rs::auth::TokenStore;
use jobboard_connector_rs::rest::Client;
use jobboard_connector_rs::types::{GetJobsParams, LoginRequest};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let base_url = std::env::var("JOBBOARD_API_URL").expect("JOBBOARD_API_URL not set");
    let email = std::env::var("JOBBOARD_EMAIL").expect("JOBBOARD_EMAIL not set");
    let password = std::env::var("JOBBOARD_PASSWORD").expect("JOBBOARD_PASSWORD not set");

    let tokens = TokenStore::new();
    let client = Client::new(&base_url, tokens, None).expect("Failed to create client");

    client
        .login(&LoginRequest {
            email: &email,
            password: &password,
        })
        .await
        .expect("Login failed");

    let params = GetJobsParams {
        limit: Some(20),
        ..Default::default()
    };
    let response = client
        .get_jobs(Some(&params))
        .await
        .expect("Failed to list jobs");

    println!("{} jobs (showing {}):", response.total, response.jobs.len());
    for job in &response.jobs {
        println!(
            "  #{} {} @ {} [{}]",
            job.id,
            job.title,
            job.company_name,
            job.location.as_deref().unwrap_or("unspecified")
        );
    }
}

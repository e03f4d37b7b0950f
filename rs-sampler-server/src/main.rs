use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use rs_sampler_core::io::{get_filename, list_files, normalize_folder};
use rs_sampler_core::model::corpus_model::CorpusModel;
use rs_sampler_core::{generate_until, GenerationInput, SampleError};

/// Server settings, read from the environment.
///
/// - `RS_SAMPLER_HOST` (default `127.0.0.1`)
/// - `RS_SAMPLER_PORT` (default `5000`)
/// - `RS_SAMPLER_DATA`: folder holding the `.txt` corpora (default `./data`)
/// - `RS_SAMPLER_SEED`: fixed seed for the shared generator (default: OS entropy)
/// - `RS_SAMPLER_ORDER`: n-gram context length of loaded models (default `6`)
#[derive(Debug)]
struct ServerConfig {
	host: String,
	port: u16,
	data_folder: PathBuf,
	seed: Option<u64>,
	order: usize,
}

impl ServerConfig {
	fn from_env() -> Result<Self, String> {
		fn parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
			match env::var(key) {
				Ok(value) => value.parse::<T>().map(Some).map_err(|_| format!("{key} is invalid: {value}")),
				Err(_) => Ok(None),
			}
		}

		Ok(Self {
			host: env::var("RS_SAMPLER_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned()),
			port: parse("RS_SAMPLER_PORT")?.unwrap_or(5000),
			data_folder: normalize_folder(&env::var("RS_SAMPLER_DATA").unwrap_or_else(|_| "./data".to_owned())),
			seed: parse("RS_SAMPLER_SEED")?,
			order: parse("RS_SAMPLER_ORDER")?.unwrap_or(6),
		})
	}
}

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	length: Option<usize>,
	diversity: Option<f64>,
	window_size: Option<usize>,
	timeout_ms: Option<u64>,
}

impl GenerateParams {
	/// Builds a validated `GenerationInput`, missing values take the defaults.
	fn generation_input(&self) -> Result<GenerationInput, SampleError> {
		let defaults = GenerationInput::default();
		GenerationInput::new(
			self.length.unwrap_or(defaults.length),
			self.diversity.unwrap_or(defaults.diversity()),
			self.window_size.unwrap_or(defaults.window_size()),
		)
	}
}

#[derive(Deserialize)]
struct CorporaQuery {
	names: Option<String>,
}

#[derive(Deserialize)]
struct ReseedQuery {
	seed: Option<u64>,
}

/// Everything generation mutates lives behind one lock: draws from the
/// shared generator are serialized, which keeps seeded runs reproducible.
struct SharedData {
	model: Option<CorpusModel>,
	rng: StdRng,
	order: usize,
	data_folder: PathBuf,
}

fn error_response(e: SampleError) -> HttpResponse {
	match e {
		SampleError::InvalidParameter(_) => HttpResponse::BadRequest().body(e.to_string()),
		SampleError::DeadlineExceeded { .. } => HttpResponse::RequestTimeout().body(e.to_string()),
		_ => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates text from the loaded corpora. The seed window is part of the
/// response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.generation_input() {
		Ok(input) => input,
		Err(e) => return error_response(e),
	};
	// Without a timeout the deadline is far enough to never trigger
	let timeout = Duration::from_millis(query.timeout_ms.unwrap_or(u32::MAX as u64));
	let deadline = Instant::now() + timeout;

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let SharedData { model, rng, .. } = &mut *shared_data;
	let model = match model {
		Some(model) => model,
		None => return HttpResponse::Conflict().body("No corpus loaded"),
	};

	match generate_until(model.corpus(), &input, &*model, model.vocabulary(), rng, deadline) {
		Ok(result) => HttpResponse::Ok().body(result.into_iter().collect::<String>()),
		Err(e) => {
			log::warn!("generation failed: {e}");
			error_response(e)
		}
	}
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let folder = match data.lock() {
		Ok(m) => m.data_folder.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let names = list_files(&folder, "txt")
		.and_then(|files| files.iter().map(get_filename).collect::<Result<Vec<String>, SampleError>>());
	match names {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e) => {
			log::warn!("listing {} failed: {e}", folder.display());
			HttpResponse::InternalServerError().body("Failed to list corpora")
		}
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let names = shared_data.model.as_ref().map(|m| m.get_corpus_names().join("\n")).unwrap_or_default();
	HttpResponse::Ok().body(names)
}

#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<CorporaQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let mut loaded: Option<CorpusModel> = None;
	for name in query_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		let corpus_path = shared_data.data_folder.join(format!("{name}.txt"));
		let partial_model = match CorpusModel::new(&corpus_path, shared_data.order) {
			Ok(m) => m,
			Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
		};
		match loaded.as_mut() {
			Some(model) => {
				if let Err(e) = model.merge(&partial_model) {
					return HttpResponse::InternalServerError().body(format!("Failed to merge corpus: {e}"));
				}
			}
			None => loaded = Some(partial_model),
		}
	}

	log::info!("loaded corpora: {query_names}");
	shared_data.model = loaded;
	HttpResponse::Ok().body("Corpora loaded successfully")
}

/// HTTP PUT endpoint `/v1/reseed`
///
/// Restarts the shared generator from `seed`: the same sequence of requests
/// then produces the same texts.
#[put("/v1/reseed")]
async fn put_reseed(data: web::Data<Mutex<SharedData>>, query: web::Query<ReseedQuery>) -> impl Responder {
	let seed = match query.seed {
		Some(seed) => seed,
		None => return HttpResponse::BadRequest().body("Missing seed"),
	};
	match data.lock() {
		Ok(mut m) => {
			m.rng = StdRng::seed_from_u64(seed);
			HttpResponse::Ok().body(format!("Reseeded with {seed}"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

fn shared_state(model: Option<CorpusModel>, rng: StdRng, order: usize, data_folder: PathBuf) -> web::Data<Mutex<SharedData>> {
	web::Data::new(Mutex::new(SharedData { model, rng, order, data_folder }))
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_corpora)
		.service(put_corpora)
		.service(get_loaded_corpora)
		.service(put_reseed);
}

/// Main entry point for the server.
///
/// Reads the configuration, wraps the shared state in a `Mutex` and starts
/// an Actix-web HTTP server. No corpus is loaded until `/v1/load_corpora`
/// is called.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config = ServerConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	log::info!("starting with {:?}", config);

	let rng = match config.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};
	let shared_model = shared_state(None, rng, config.order, config.data_folder.clone());

	HttpServer::new(move || App::new().wrap(Cors::permissive()).app_data(shared_model.clone()).configure(routes))
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}

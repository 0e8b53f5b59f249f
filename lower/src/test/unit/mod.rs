mod errors;
mod scenario;

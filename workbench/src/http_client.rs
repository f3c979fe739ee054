//! HTTP client for a remote workbench server
//!
//! Only available when the "http" feature is enabled.

#[cfg(feature = "http")]
pub mod http_impl {
    use reqwest::Client;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use serde_json::Value;

    use crate::api::*;
    use crate::error::{Result, ServiceError};
    use crate::operation::Request;

    /// Typed client for the workbench JSON API
    pub struct HttpWorkbench {
        client: Client,
        base_url: String,
    }

    impl HttpWorkbench {
        /// Create a client for the server at `base_url`, e.g. `http://127.0.0.1:8000`
        pub fn new(base_url: &str) -> Self {
            Self {
                client: Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, route: &str) -> String {
            format!("{}{route}", self.base_url)
        }

        async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ServiceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.json().await?)
        }

        async fn post<B, T>(&self, route: &str, body: &B) -> Result<T>
        where
            B: Serialize + ?Sized,
            T: DeserializeOwned,
        {
            let response = self.client.post(self.url(route)).json(body).send().await?;
            Self::decode(response).await
        }

        async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
            let response = self.client.get(self.url(route)).send().await?;
            Self::decode(response).await
        }

        /// Service banner and route list
        pub async fn banner(&self) -> Result<Value> {
            self.get("/").await
        }

        /// Send any request to its route and return the raw JSON response
        pub async fn execute(&self, request: &Request) -> Result<Value> {
            match request {
                Request::MatrixOperate(r) => self.post(request.route(), r).await,
                Request::Determinant(r) => self.post(request.route(), r).await,
                Request::DeterminantProperties(r) => self.post(request.route(), r).await,
                Request::LinearSystem(r) => self.post(request.route(), r).await,
                Request::Independence(r) => self.post(request.route(), r).await,
                Request::Basis(r) => self.post(request.route(), r).await,
                Request::Combination(r) => self.post(request.route(), r).await,
                Request::Bisection(r) | Request::FalsePosition(r) => {
                    self.post(request.route(), r).await
                }
                Request::NewtonRaphson(r) => self.post(request.route(), r).await,
                Request::Secant(r) => self.post(request.route(), r).await,
                Request::DecomposeBase10(r) | Request::DecomposeBase2(r) => {
                    self.post(request.route(), r).await
                }
                Request::Roundoff(r) => self.post(request.route(), r).await,
                Request::Truncation(r) => self.post(request.route(), r).await,
                Request::Propagation(r) => self.post(request.route(), r).await,
                Request::FunctionPropagation(r) => self.post(request.route(), r).await,
                Request::FloatingPoint => self.get(request.route()).await,
            }
        }

        /// Evaluate several requests in one round trip
        pub async fn execute_batch(&self, requests: &[Request]) -> Result<Vec<Value>> {
            self.post("/batch", requests).await
        }

        pub async fn matrix_operate(
            &self,
            request: &MatrixOperationRequest,
        ) -> Result<MatrixOperationResponse> {
            self.post("/matrix/operate", request).await
        }

        pub async fn determinant(&self, request: &DeterminantRequest) -> Result<DeterminantResponse> {
            self.post("/determinants/calculate", request).await
        }

        pub async fn linear_system(
            &self,
            request: &LinearSystemRequest,
        ) -> Result<LinearSystemResponse> {
            self.post("/linear-systems/solve", request).await
        }

        pub async fn independence(&self, request: &VectorsRequest) -> Result<VectorsResponse> {
            self.post("/vectors/independence", request).await
        }

        pub async fn basis(&self, request: &BasisRequest) -> Result<VectorsResponse> {
            self.post("/vectors/basis", request).await
        }

        pub async fn bisection(&self, request: &BracketRequest) -> Result<NumericalResponse> {
            self.post("/numerical/bisection", request).await
        }

        pub async fn newton_raphson(&self, request: &NewtonRequest) -> Result<NumericalResponse> {
            self.post("/numerical/newton-raphson", request).await
        }
    }
}

#[cfg(not(feature = "http"))]
pub mod http_stub {
    use serde_json::Value;

    use crate::error::{Result, ServiceError};
    use crate::operation::Request;

    pub struct HttpWorkbench;

    impl HttpWorkbench {
        pub fn new(_base_url: &str) -> Self {
            Self
        }

        pub async fn execute(&self, _request: &Request) -> Result<Value> {
            Err(ServiceError::Unsupported(
                "HTTP support not enabled. Build with --features http",
            ))
        }

        pub async fn execute_batch(&self, _requests: &[Request]) -> Result<Vec<Value>> {
            Err(ServiceError::Unsupported(
                "HTTP support not enabled. Build with --features http",
            ))
        }
    }
}

#[cfg(feature = "http")]
pub use http_impl::*;

#[cfg(not(feature = "http"))]
pub use http_stub::*;

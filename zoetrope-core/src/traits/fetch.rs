//! HTTP fetch seam
//!
//! Panels describe requests; the platform owns sockets, DNS, and timeouts.
//! Responses land in a caller-provided buffer, so the trait works the same
//! over an embassy-net socket on the frame and a canned byte slice in a
//! host test.

/// Errors from the fetch implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError {
    /// Hostname did not resolve
    Dns,
    /// TCP connect failed
    Connect,
    /// Socket read/write failed
    Io,
    /// Response was not parseable HTTP
    Protocol,
    /// Server answered with a non-2xx status
    Status(u16),
    /// Response body did not fit the buffer
    Overflow,
    /// Body failed to deserialize
    Payload,
    /// URL scheme unsupported (TLS terminates off-device)
    Scheme,
    /// No response within the timeout
    Timeout,
}

/// Minimal HTTP client capability
///
/// Implementations write the response body into `out` and return its
/// length. Only 2xx responses succeed.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// GET `url`, sending `headers` verbatim after the standard set
    async fn get(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        out: &mut [u8],
    ) -> Result<usize, ServiceError>;

    /// POST a JSON `body` to `url`
    async fn post_json(
        &mut self,
        url: &str,
        body: &str,
        out: &mut [u8],
    ) -> Result<usize, ServiceError>;
}

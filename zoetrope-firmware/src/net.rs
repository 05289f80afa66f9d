//! Minimal HTTP/1.0 client over embassy-net
//!
//! Implements the panels' `Fetch` seam: DNS (or a literal IPv4 host), one
//! TCP connection per request, `Connection: close`, body read to EOF into
//! the caller's buffer. Plain HTTP only - TLS terminates off-device at the
//! LAN proxy, and HTTP/1.0 keeps chunked encoding out of the picture.

use core::fmt::Write as _;
use core::net::Ipv4Addr;

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_time::{with_timeout, Duration};
use heapless::String;
use zoetrope_core::traits::{Fetch, ServiceError};

/// Per-request inactivity timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const RX_BUFFER: usize = 4096;
const TX_BUFFER: usize = 1024;
/// Request line plus headers
const MAX_REQUEST: usize = 512;

struct Url<'a> {
    host: &'a str,
    port: u16,
    path: &'a str,
}

fn parse_url(url: &str) -> Result<Url<'_>, ServiceError> {
    let rest = url.strip_prefix("http://").ok_or(ServiceError::Scheme)?;
    let (host_port, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, "/"),
    };
    let (host, port) = match host_port.split_once(':') {
        Some((h, p)) => (h, p.parse().map_err(|_| ServiceError::Protocol)?),
        None => (host_port, 80),
    };
    if host.is_empty() {
        return Err(ServiceError::Protocol);
    }
    Ok(Url { host, port, path })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// One-connection-per-request HTTP client
pub struct HttpClient {
    stack: Stack<'static>,
    rx_buffer: [u8; RX_BUFFER],
    tx_buffer: [u8; TX_BUFFER],
}

impl HttpClient {
    pub fn new(stack: Stack<'static>) -> Self {
        Self {
            stack,
            rx_buffer: [0; RX_BUFFER],
            tx_buffer: [0; TX_BUFFER],
        }
    }

    async fn resolve(&self, host: &str) -> Result<IpAddress, ServiceError> {
        // Literal IPv4 hosts (the Pi-hole case) skip DNS entirely
        if let Ok(v4) = host.parse::<Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(v4));
        }
        let addrs = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|_| ServiceError::Dns)?;
        addrs.first().copied().ok_or(ServiceError::Dns)
    }

    async fn request(
        &mut self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<(&str, &[u8])>,
        out: &mut [u8],
    ) -> Result<usize, ServiceError> {
        let url = parse_url(url)?;
        let address = self.resolve(url.host).await?;

        let mut request: String<MAX_REQUEST> = String::new();
        write!(
            request,
            "{} {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n",
            method, url.path, url.host
        )
        .map_err(|_| ServiceError::Overflow)?;
        for (name, value) in headers {
            write!(request, "{}: {}\r\n", name, value).map_err(|_| ServiceError::Overflow)?;
        }
        if let Some((content_type, payload)) = body {
            write!(
                request,
                "Content-Type: {}\r\nContent-Length: {}\r\n",
                content_type,
                payload.len()
            )
            .map_err(|_| ServiceError::Overflow)?;
        }
        request.push_str("\r\n").map_err(|_| ServiceError::Overflow)?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(HTTP_TIMEOUT));

        with_timeout(CONNECT_TIMEOUT, socket.connect((address, url.port)))
            .await
            .map_err(|_| ServiceError::Timeout)?
            .map_err(|_| ServiceError::Connect)?;

        write_all(&mut socket, request.as_bytes()).await?;
        if let Some((_, payload)) = body {
            write_all(&mut socket, payload).await?;
        }

        // Drain the whole response; Connection: close bounds it
        let mut total = 0;
        loop {
            if total == out.len() {
                let mut probe = [0u8; 1];
                match socket.read(&mut probe).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => return Err(ServiceError::Overflow),
                }
            }
            match socket.read(&mut out[total..]).await {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(_) => return Err(ServiceError::Io),
            }
        }
        socket.close();

        let headers_end = find(&out[..total], b"\r\n\r\n").ok_or(ServiceError::Protocol)?;

        // Status line: "HTTP/1.x NNN ..."
        let line = &out[..headers_end];
        let space = line
            .iter()
            .position(|&b| b == b' ')
            .ok_or(ServiceError::Protocol)?;
        let digits = line.get(space + 1..space + 4).ok_or(ServiceError::Protocol)?;
        let mut status: u16 = 0;
        for &b in digits {
            if !b.is_ascii_digit() {
                return Err(ServiceError::Protocol);
            }
            status = status * 10 + (b - b'0') as u16;
        }
        if !(200..300).contains(&status) {
            debug!("HTTP {} from {}", status, url.host);
            return Err(ServiceError::Status(status));
        }

        let body_start = headers_end + 4;
        out.copy_within(body_start..total, 0);
        Ok(total - body_start)
    }
}

async fn write_all(socket: &mut TcpSocket<'_>, mut data: &[u8]) -> Result<(), ServiceError> {
    while !data.is_empty() {
        let n = socket.write(data).await.map_err(|_| ServiceError::Io)?;
        if n == 0 {
            return Err(ServiceError::Io);
        }
        data = &data[n..];
    }
    Ok(())
}

impl Fetch for HttpClient {
    async fn get(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        out: &mut [u8],
    ) -> Result<usize, ServiceError> {
        self.request("GET", url, headers, None, out).await
    }

    async fn post_json(
        &mut self,
        url: &str,
        body: &str,
        out: &mut [u8],
    ) -> Result<usize, ServiceError> {
        self.request("POST", url, &[], Some(("application/json", body.as_bytes())), out)
            .await
    }
}

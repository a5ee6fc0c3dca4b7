use std::io::{self, BufRead, Read};

const CHUNK: usize = 8 * 1024;

/// Reader with explicit, non-destructive lookahead.
///
/// Bytes returned by [`peek`](Self::peek) stay buffered and are handed out
/// again by subsequent reads, so sniffing a stream never consumes it.
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    buf:   Vec<u8>,
    pos:   usize,
}

impl<R: Read> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(CHUNK),
            pos: 0,
        }
    }

    /// Returns the next `n` bytes without consuming them.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the stream ends first.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        if self.buffered().len() < n {
            self.fill_to(n)?;
        }
        let available = self.buffered().len();
        if available < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended after {available} bytes, {n} needed for lookahead"),
            ));
        }
        Ok(&self.buf[self.pos..self.pos + n])
    }

    /// Consumes `n` bytes, reading past the buffer if needed.
    pub fn advance(&mut self, n: usize) -> io::Result<()> {
        let from_buf = n.min(self.buffered().len());
        self.pos += from_buf;
        let rest = (n - from_buf) as u64;
        if rest > 0 {
            let skipped = io::copy(&mut (&mut self.inner).take(rest), &mut io::sink())?;
            if skipped < rest {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
        }
        Ok(())
    }

    /// Bytes already pulled from the inner reader but not yet consumed.
    pub fn buffered(&self) -> &[u8] { &self.buf[self.pos..] }

    pub fn get_ref(&self) -> &R { &self.inner }

    fn fill_to(&mut self, n: usize) -> io::Result<()> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        let mut chunk = [0u8; CHUNK];
        while self.buf.len() < n {
            match self.inner.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => self.buf.extend_from_slice(&chunk[..read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.buffered().is_empty() && out.len() >= CHUNK {
            return self.inner.read(out);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for PeekReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffered().is_empty() {
            self.fill_to(1)?;
        }
        Ok(self.buffered())
    }

    fn consume(&mut self, amt: usize) { self.pos = (self.pos + amt).min(self.buf.len()); }
}

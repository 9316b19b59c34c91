//! # Output — Prime Sinks
//!
//! The engine hands its ordered output to an [`OutputSink`]. Sinks receive
//! primes strictly in ascending order from a single thread; segment tasks never
//! touch the final sink. Instead each task fills a private buffer obtained from
//! [`BufferedSink::buffer`], and the coordinator splices the finished buffers
//! back in range order with [`BufferedSink::append`].
//!
//! ## Text Format
//!
//! [`TextSink`] renders every prime as ASCII decimal followed by one space:
//! `"2 3 5 7 "`. Because each rendered prime carries its own separator, the
//! rendering of a partition is the byte-wise concatenation of the renderings of
//! its pieces.

use std::io::Write;

use crate::error::SieveError;

pub trait OutputSink {
    fn push(&mut self, prime: u32) -> Result<(), SieveError>;

    fn emit(&mut self, primes: &[u32]) -> Result<(), SieveError> {
        for &p in primes {
            self.push(p)?;
        }
        Ok(())
    }

    /// Flush anything still buffered. Called once after the last prime.
    fn finish(&mut self) -> Result<(), SieveError> {
        Ok(())
    }
}

/// A sink that can hand out independent per-segment buffers and splice them
/// back in order.
pub trait BufferedSink: OutputSink {
    type Buffer: OutputSink + Send;

    fn buffer(&self) -> Self::Buffer;

    fn append(&mut self, buffer: Self::Buffer) -> Result<(), SieveError>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn push(&mut self, prime: u32) -> Result<(), SieveError> {
        (**self).push(prime)
    }

    fn emit(&mut self, primes: &[u32]) -> Result<(), SieveError> {
        (**self).emit(primes)
    }

    fn finish(&mut self) -> Result<(), SieveError> {
        (**self).finish()
    }
}

impl OutputSink for Vec<u32> {
    #[inline]
    fn push(&mut self, prime: u32) -> Result<(), SieveError> {
        Vec::push(self, prime);
        Ok(())
    }

    fn emit(&mut self, primes: &[u32]) -> Result<(), SieveError> {
        self.extend_from_slice(primes);
        Ok(())
    }
}

impl BufferedSink for Vec<u32> {
    type Buffer = Vec<u32>;

    fn buffer(&self) -> Vec<u32> {
        Vec::new()
    }

    fn append(&mut self, mut buffer: Vec<u32>) -> Result<(), SieveError> {
        Vec::append(self, &mut buffer);
        Ok(())
    }
}

/// Writes primes as space-terminated ASCII decimal.
pub struct TextSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        TextSink { writer, written: 0 }
    }

    /// Number of primes written so far, including appended buffers.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for TextSink<W> {
    #[inline]
    fn push(&mut self, prime: u32) -> Result<(), SieveError> {
        write!(self.writer, "{} ", prime)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SieveError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> BufferedSink for TextSink<W> {
    type Buffer = TextSink<Vec<u8>>;

    fn buffer(&self) -> TextSink<Vec<u8>> {
        TextSink::new(Vec::new())
    }

    fn append(&mut self, buffer: TextSink<Vec<u8>>) -> Result<(), SieveError> {
        self.writer.write_all(&buffer.writer)?;
        self.written += buffer.written;
        Ok(())
    }
}

/// Counts primes without storing them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountSink {
    pub count: u64,
    pub largest: Option<u32>,
}

impl OutputSink for CountSink {
    #[inline]
    fn push(&mut self, prime: u32) -> Result<(), SieveError> {
        self.count += 1;
        self.largest = Some(prime);
        Ok(())
    }

    fn emit(&mut self, primes: &[u32]) -> Result<(), SieveError> {
        if let Some(&last) = primes.last() {
            self.count += primes.len() as u64;
            self.largest = Some(last);
        }
        Ok(())
    }
}

impl BufferedSink for CountSink {
    type Buffer = CountSink;

    fn buffer(&self) -> CountSink {
        CountSink::default()
    }

    fn append(&mut self, buffer: CountSink) -> Result<(), SieveError> {
        self.count += buffer.count;
        if buffer.largest.is_some() {
            self.largest = buffer.largest;
        }
        Ok(())
    }
}

/// Wraps a sink and records how many primes passed through it.
pub struct Tally<S> {
    inner: S,
    count: u64,
    largest: Option<u32>,
}

impl<S> Tally<S> {
    pub fn new(inner: S) -> Self {
        Tally {
            inner,
            count: 0,
            largest: None,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn largest(&self) -> Option<u32> {
        self.largest
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: OutputSink> OutputSink for Tally<S> {
    #[inline]
    fn push(&mut self, prime: u32) -> Result<(), SieveError> {
        self.inner.push(prime)?;
        self.count += 1;
        self.largest = Some(prime);
        Ok(())
    }

    fn emit(&mut self, primes: &[u32]) -> Result<(), SieveError> {
        self.inner.emit(primes)?;
        if let Some(&last) = primes.last() {
            self.count += primes.len() as u64;
            self.largest = Some(last);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SieveError> {
        self.inner.finish()
    }
}

/// Render primes in the text format used by [`TextSink`].
pub fn render(primes: &[u32]) -> String {
    let mut out = String::with_capacity(primes.len() * 8);
    for p in primes {
        out.push_str(&p.to_string());
        out.push(' ');
    }
    out
}

//! The dual-mode field contract.
//!
//! A schema is written once against [`ReadWriter`] and runs in both
//! directions: `x = rw.u32(x)?` decodes a fresh value into `x`, or encodes
//! `x` and hands it back unchanged.

use gfs_buffers::{Reader, Reservation, Writer};

use crate::blob::RawBytes;
use crate::context::{Context, Direction};
use crate::error::{GfsError, Result};
use crate::errorlog::ErrorLog;
use crate::options::{CodecOptions, LengthPolicy};
use crate::version::GfsVersion;

/// Deepest node hierarchy accepted before giving up.
pub const MAX_DEPTH: usize = 256;

/// A value that can be moved through a [`ReadWriter`].
pub trait ReadWrite {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()>;
}

/// Where a sized block starts measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeOrigin {
    /// Absolute stream offset, e.g. the start of the enclosing record.
    At(usize),
    /// The first byte after the size field itself.
    AfterField,
}

enum Stream<'a> {
    Decode(Reader<'a>),
    Encode(Writer),
}

macro_rules! primitive {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) -> Result<$ty> {
                match &mut self.stream {
                    Stream::Decode(r) => Ok(r.$name()?),
                    Stream::Encode(w) => {
                        w.$name(value);
                        Ok(value)
                    }
                }
            }
        )*
    };
}

macro_rules! counted {
    ($($name:ident => $len:ident),* $(,)?) => {
        $(
            /// Count prefix followed by that many items.
            pub fn $name<T: ReadWrite + Default>(
                &mut self,
                items: &mut Vec<T>,
                what: &'static str,
            ) -> Result<()> {
                let count = self.$len(items.len(), what)?;
                self.seq(items, count)
            }
        )*
    };
}

pub struct ReadWriter<'a> {
    stream: Stream<'a>,
    context: Context,
    policy: LengthPolicy,
    minimum_version: GfsVersion,
    log: ErrorLog,
    depth: usize,
}

impl<'a> ReadWriter<'a> {
    pub fn decoder(bytes: &'a [u8], options: &CodecOptions) -> Self {
        Self {
            stream: Stream::Decode(Reader::with_endianness(bytes, options.endianness)),
            context: Context::new(Direction::Decode, options.endianness),
            policy: options.length_policy,
            minimum_version: GfsVersion(options.minimum_version),
            log: ErrorLog::new(),
            depth: 0,
        }
    }

    pub fn encoder(options: &CodecOptions) -> ReadWriter<'static> {
        ReadWriter {
            stream: Stream::Encode(Writer::with_endianness(options.endianness)),
            context: Context::new(Direction::Encode, options.endianness),
            policy: options.length_policy,
            minimum_version: GfsVersion(options.minimum_version),
            log: ErrorLog::new(),
            depth: 0,
        }
    }

    /// Returns the encoded bytes (empty when decoding) and the diagnostics.
    pub fn finish(self) -> (Vec<u8>, ErrorLog) {
        match self.stream {
            Stream::Decode(_) => (Vec::new(), self.log),
            Stream::Encode(mut w) => (w.flush(), self.log),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn direction(&self) -> Direction {
        self.context.direction
    }

    pub fn is_decoding(&self) -> bool {
        self.context.is_decoding()
    }

    pub fn version(&self) -> GfsVersion {
        self.context.version
    }

    pub fn length_policy(&self) -> LengthPolicy {
        self.policy
    }

    /// Oldest container version this traversal accepts.
    pub fn minimum_version(&self) -> GfsVersion {
        self.minimum_version
    }

    pub fn log(&mut self) -> &mut ErrorLog {
        &mut self.log
    }

    pub fn position(&self) -> usize {
        match &self.stream {
            Stream::Decode(r) => r.position(),
            Stream::Encode(w) => w.position(),
        }
    }

    /// Bytes left in the readable window; always zero when encoding.
    pub fn remaining(&self) -> usize {
        match &self.stream {
            Stream::Decode(r) => r.size(),
            Stream::Encode(_) => 0,
        }
    }

    /// Runs `f` with `version` in effect and restores the previous one.
    pub fn with_version<R>(
        &mut self,
        version: GfsVersion,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = std::mem::replace(&mut self.context.version, version);
        let result = f(self);
        self.context.version = previous;
        result
    }

    /// Runs `f` one level deeper in a recursive structure.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= MAX_DEPTH {
            return Err(GfsError::NestingTooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ---- primitives

    primitive! {
        u8: u8,
        i8: i8,
        u16: u16,
        i16: i16,
        u32: u32,
        i32: i32,
        u64: u64,
        i64: i64,
        f32: f32,
        f64: f64,
    }

    pub fn array<const N: usize>(&mut self, value: [u8; N]) -> Result<[u8; N]> {
        match &mut self.stream {
            Stream::Decode(r) => Ok(r.array::<N>()?),
            Stream::Encode(w) => {
                w.buf(&value);
                Ok(value)
            }
        }
    }

    /// Exactly `len` raw bytes.
    pub fn bytes(&mut self, value: &mut Vec<u8>, len: usize, what: &'static str) -> Result<()> {
        match &mut self.stream {
            Stream::Decode(r) => {
                *value = r.buf(len)?.to_vec();
                Ok(())
            }
            Stream::Encode(w) => {
                if value.len() != len {
                    return Err(GfsError::LengthMismatch {
                        what,
                        declared: len,
                        actual: value.len(),
                    });
                }
                w.buf(value);
                Ok(())
            }
        }
    }

    /// Everything up to the end of the current window.
    pub fn rest(&mut self, value: &mut Vec<u8>) -> Result<()> {
        match &mut self.stream {
            Stream::Decode(r) => *value = r.rest().to_vec(),
            Stream::Encode(w) => w.buf(value),
        }
        Ok(())
    }

    /// A `u32` length followed by that many bytes.
    pub fn lp_bytes(&mut self, value: &mut Vec<u8>) -> Result<()> {
        match &mut self.stream {
            Stream::Decode(r) => *value = r.lp_bytes()?.to_vec(),
            Stream::Encode(w) => w.lp_bytes(value)?,
        }
        Ok(())
    }

    /// A one-byte presence marker. Any nonzero byte means present. A byte
    /// other than 0 or 1 is kept in `raw` and written back unchanged while
    /// the value stays present.
    pub fn presence(&mut self, present: bool, raw: &mut Option<u8>) -> Result<bool> {
        let byte = match *raw {
            Some(byte) if present && byte > 1 => byte,
            _ => present as u8,
        };
        let byte = self.u8(byte)?;
        if self.is_decoding() {
            *raw = (byte > 1).then_some(byte);
        }
        Ok(byte != 0)
    }

    // ---- assertions

    /// Decodes a `u32` that must equal `expected`, or encodes `expected`.
    pub fn assert_u32(&mut self, expected: u32, what: &'static str) -> Result<()> {
        let offset = self.position();
        let found = self.u32(expected)?;
        if found != expected {
            return Err(GfsError::AssertionFailed {
                what,
                expected: expected as u64,
                found: found as u64,
                offset,
            });
        }
        Ok(())
    }

    pub fn assert_u8(&mut self, expected: u8, what: &'static str) -> Result<()> {
        let offset = self.position();
        let found = self.u8(expected)?;
        if found != expected {
            return Err(GfsError::AssertionFailed {
                what,
                expected: expected as u64,
                found: found as u64,
                offset,
            });
        }
        Ok(())
    }

    // ---- counts and collections

    pub fn len_u8(&mut self, len: usize, what: &'static str) -> Result<usize> {
        let value = narrow::<u8>(len, what)?;
        Ok(self.u8(value)? as usize)
    }

    pub fn len_u16(&mut self, len: usize, what: &'static str) -> Result<usize> {
        let value = narrow::<u16>(len, what)?;
        Ok(self.u16(value)? as usize)
    }

    pub fn len_u32(&mut self, len: usize, what: &'static str) -> Result<usize> {
        let value = narrow::<u32>(len, what)?;
        Ok(self.u32(value)? as usize)
    }

    pub fn field<T: ReadWrite>(&mut self, value: &mut T) -> Result<()> {
        value.read_write(self)
    }

    /// `count` items. Decoding grows the vector one item at a time so a
    /// corrupt count fails on the stream rather than on allocation.
    pub fn seq<T: ReadWrite + Default>(&mut self, items: &mut Vec<T>, count: usize) -> Result<()> {
        self.seq_with(items, count, |rw, item| item.read_write(rw))
    }

    pub fn seq_with<T: Default>(
        &mut self,
        items: &mut Vec<T>,
        count: usize,
        mut f: impl FnMut(&mut Self, &mut T) -> Result<()>,
    ) -> Result<()> {
        if self.is_decoding() {
            items.clear();
            for _ in 0..count {
                let mut item = T::default();
                f(self, &mut item)?;
                items.push(item);
            }
            return Ok(());
        }
        if items.len() != count {
            return Err(GfsError::Inconsistent {
                what: format!("collection holds {} items but count is {count}", items.len()),
            });
        }
        for item in items.iter_mut() {
            f(self, item)?;
        }
        Ok(())
    }

    counted! {
        counted_u8 => len_u8,
        counted_u16 => len_u16,
        counted_u32 => len_u32,
    }

    // ---- gated fields

    /// A field present only when `present` holds (a version threshold or a
    /// flag bit). A closed gate decodes to `None` and never emits anything.
    pub fn gated<T: ReadWrite + Default>(
        &mut self,
        present: bool,
        value: &mut Option<T>,
        what: &'static str,
    ) -> Result<()> {
        self.gated_with(present, value, what, |rw, v| v.read_write(rw))
    }

    pub fn gated_with<T: Default>(
        &mut self,
        present: bool,
        value: &mut Option<T>,
        what: &'static str,
        f: impl FnOnce(&mut Self, &mut T) -> Result<()>,
    ) -> Result<()> {
        if !present {
            if self.is_decoding() {
                *value = None;
            }
            return Ok(());
        }
        if self.is_decoding() {
            let mut item = T::default();
            f(self, &mut item)?;
            *value = Some(item);
            return Ok(());
        }
        match value {
            Some(item) => f(self, item),
            None => Err(GfsError::MissingField { what }),
        }
    }

    // ---- sized blocks

    /// A `u32` size followed by a block it measures.
    ///
    /// Encoding reserves the size, runs `body`, re-emits `tail`, then
    /// backpatches the slot and stores the value into `size`. Decoding bounds
    /// the reader to the declared size, so the body cannot overrun it; bytes
    /// the body leaves unread are either kept in `tail` with a warning or
    /// rejected, depending on the length policy.
    pub fn sized(
        &mut self,
        size: &mut u32,
        origin: SizeOrigin,
        what: &'static str,
        tail: &mut Option<RawBytes>,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        match self.reserve_u32() {
            None => self.sized_decode(size, origin, what, tail, body),
            Some(slot) => self.sized_encode(slot, size, origin, what, tail, body),
        }
    }

    /// Reserves a size slot; there is nothing to reserve when decoding.
    fn reserve_u32(&mut self) -> Option<Reservation> {
        match &mut self.stream {
            Stream::Decode(_) => None,
            Stream::Encode(writer) => Some(writer.reserve_u32()),
        }
    }

    fn sized_decode(
        &mut self,
        size: &mut u32,
        origin: SizeOrigin,
        what: &'static str,
        tail: &mut Option<RawBytes>,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let declared = self.u32(*size)?;
        *size = declared;
        let start = match origin {
            SizeOrigin::At(offset) => offset,
            SizeOrigin::AfterField => self.position(),
        };
        let end = start.saturating_add(declared as usize);
        let here = self.position();
        if end < here {
            return Err(GfsError::LengthMismatch {
                what,
                declared: declared as usize,
                actual: here - start,
            });
        }
        let outer_end = self.limit(end)?;
        let result = body(self).and_then(|()| self.take_tail(what, declared, start, tail));
        self.restore_end(outer_end);
        result
    }

    fn take_tail(
        &mut self,
        what: &'static str,
        declared: u32,
        start: usize,
        tail: &mut Option<RawBytes>,
    ) -> Result<()> {
        let unread = self.remaining();
        if unread == 0 {
            *tail = None;
            return Ok(());
        }
        let consumed = self.position() - start;
        if self.policy == LengthPolicy::Strict {
            return Err(GfsError::LengthMismatch {
                what,
                declared: declared as usize,
                actual: consumed,
            });
        }
        self.log.log_warning(format!(
            "{what}: declared {declared} bytes but schema consumed {consumed}; keeping {unread} trailing bytes"
        ));
        let mut bytes = RawBytes::default();
        self.rest(&mut bytes.0)?;
        *tail = Some(bytes);
        Ok(())
    }

    fn sized_encode(
        &mut self,
        slot: Reservation,
        size: &mut u32,
        origin: SizeOrigin,
        what: &'static str,
        tail: &mut Option<RawBytes>,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let start = match origin {
            SizeOrigin::At(offset) => offset,
            SizeOrigin::AfterField => self.position(),
        };
        body(self)?;
        if let Some(bytes) = tail {
            self.rest(&mut bytes.0)?;
        }
        let value = narrow::<u32>(self.position() - start, what)?;
        if let Stream::Encode(writer) = &mut self.stream {
            writer.patch_u32(slot, value)?;
        }
        *size = value;
        Ok(())
    }

    fn limit(&mut self, end: usize) -> Result<usize> {
        match &mut self.stream {
            Stream::Decode(reader) => Ok(reader.limit(end)?),
            Stream::Encode(_) => Ok(end),
        }
    }

    fn restore_end(&mut self, end: usize) {
        if let Stream::Decode(reader) = &mut self.stream {
            reader.restore_end(end);
        }
    }
}

/// Implements [`ReadWrite`] for a struct whose fields are all `ReadWrite`,
/// in the listed order.
macro_rules! read_write_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::rw::ReadWrite for $ty {
            fn read_write(&mut self, rw: &mut $crate::rw::ReadWriter<'_>) -> $crate::error::Result<()> {
                $(rw.field(&mut self.$field)?;)*
                Ok(())
            }
        }
    };
}

pub(crate) use read_write_fields;

fn narrow<T: TryFrom<usize>>(len: usize, what: &'static str) -> Result<T> {
    T::try_from(len).map_err(|_| GfsError::TooMany {
        what,
        count: len,
        max: max_of::<T>(),
    })
}

fn max_of<T>() -> usize {
    match std::mem::size_of::<T>() {
        1 => u8::MAX as usize,
        2 => u16::MAX as usize,
        _ => u32::MAX as usize,
    }
}

macro_rules! read_write_primitive {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ReadWrite for $ty {
                fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
                    *self = rw.$ty(*self)?;
                    Ok(())
                }
            }
        )*
    };
}

read_write_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<T: ReadWrite, const N: usize> ReadWrite for [T; N] {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        for item in self.iter_mut() {
            item.read_write(rw)?;
        }
        Ok(())
    }
}

impl<T: ReadWrite + ?Sized> ReadWrite for Box<T> {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        (**self).read_write(rw)
    }
}

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use kiln_dtype::{DType, HasDType};
use snafu::ensure;

use crate::error::{AllocationSnafu, DTypeMismatchSnafu, Result, SizeMismatchSnafu};

/// Flat, zero-initialised host memory holding `len` elements of one dtype.
///
/// Backed by `u64` words so every supported element type is properly aligned.
/// Written by exactly one kernel invocation and only read afterwards.
///
/// `!Send + !Sync`: the graph that owns storage is single-threaded.
#[derive(Debug)]
pub struct Storage {
    words: RefCell<Box<[u64]>>,
    dtype: DType,
    len: usize,
    _not_send_sync: PhantomData<Rc<()>>,
}

impl Storage {
    /// Allocate zeroed storage for `len` elements.
    pub fn allocate(dtype: DType, len: usize) -> Result<Self> {
        let words = len
            .checked_mul(dtype.bytes())
            .map(|bytes| bytes.div_ceil(size_of::<u64>()))
            .ok_or_else(|| AllocationSnafu { dtype, len, reason: "size overflows usize" }.build())?;

        let mut data: Vec<u64> = Vec::new();
        data.try_reserve_exact(words)
            .map_err(|e| AllocationSnafu { dtype, len, reason: e.to_string() }.build())?;
        data.resize(words, 0);

        tracing::trace!(%dtype, len, bytes = len * dtype.bytes(), "storage allocated");

        Ok(Self { words: RefCell::new(data.into_boxed_slice()), dtype, len, _not_send_sync: PhantomData })
    }

    /// Allocate storage holding a copy of `data`.
    pub fn from_slice<T: HasDType>(data: &[T]) -> Result<Self> {
        let storage = Self::allocate(T::DTYPE, data.len())?;
        storage.copyin(data)?;
        Ok(storage)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn size_bytes(&self) -> usize {
        self.len * self.dtype.bytes()
    }

    /// Overwrite the whole storage with `src`.
    pub fn copyin<T: HasDType>(&self, src: &[T]) -> Result<()> {
        ensure!(T::DTYPE == self.dtype, DTypeMismatchSnafu { expected: T::DTYPE, actual: self.dtype });
        ensure!(src.len() == self.len, SizeMismatchSnafu { expected: self.len, actual: src.len() });

        let mut words = self.words.borrow_mut();
        // SAFETY: dtype check above guarantees `T` matches the element layout, the
        // word buffer holds at least `len * size_of::<T>()` bytes and is 8-byte aligned.
        let dst = unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut T, self.len) };
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Run `f` over the elements as a flat contiguous slice.
    pub fn with_slice<T: HasDType, R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        ensure!(T::DTYPE == self.dtype, DTypeMismatchSnafu { expected: T::DTYPE, actual: self.dtype });

        let words = self.words.borrow();
        // SAFETY: see `copyin`; every bit pattern is a valid f32/f64.
        let slice = unsafe { std::slice::from_raw_parts(words.as_ptr() as *const T, self.len) };
        Ok(f(slice))
    }

    /// Copy the elements out.
    pub fn to_vec<T: HasDType>(&self) -> Result<Vec<T>> {
        self.with_slice(|s: &[T]| s.to_vec())
    }

    /// Raw pointer to the first element, for passing to compiled kernels.
    ///
    /// # Safety
    ///
    /// The pointer is valid for `size_bytes()` bytes while `self` is alive. The caller
    /// must not hold a slice from [`Storage::with_slice`] while a kernel writes through it.
    pub unsafe fn as_raw_ptr(&self) -> *mut u8 {
        self.words.borrow_mut().as_mut_ptr() as *mut u8
    }
}

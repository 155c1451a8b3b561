use super::ConfigError;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "alloc")]
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Adapter trait for reading a contiguous 1D sample buffer.
///
/// Lets design functions accept slices, vectors, or ndarray views without
/// committing the API to one container.
pub trait Read1D<T> {
    /// Borrow the underlying samples as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing a contiguous 1D output buffer.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

#[cfg(feature = "alloc")]
impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

#[cfg(feature = "alloc")]
impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

#[cfg(feature = "alloc")]
impl<'a, T> Read1D<T> for ArrayView1<'a, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array_view" })
    }
}

#[cfg(feature = "alloc")]
impl<'a, T> Write1D<T> for ArrayViewMut1<'a, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut().ok_or(ConfigError::NonContiguous {
            arg: "array_view_mut",
        })
    }
}

//! Dynamic-capacity flat numeric buffer.
//!
//! The star count is only known once the whole catalog has been decoded, so the position and
//! magnitude buffers grow while records are appended. The backing storage is always fully
//! initialised: slots past [`GrowableBuffer::len`] hold `T::default()` and are never exposed
//! through [`GrowableBuffer::as_slice`].
//!
//! Growth policy
//! -----------------
//! The capacity doubles (2 → 4 → 8 → ...) until the pending append fits, and the live prefix
//! is copied into the new storage. Appends are amortized O(1).

/// Flat append-only buffer of `Copy` values.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowableBuffer<T> {
    storage: Vec<T>,
    len: usize,
}

impl<T: Copy + Default> GrowableBuffer<T> {
    /// Create a buffer with the given initial capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        GrowableBuffer {
            storage: vec![T::default(); capacity.max(1)],
            len: 0,
        }
    }

    /// Append values at the logical end, doubling the capacity as many times as needed.
    pub fn append(&mut self, values: &[T]) {
        let needed = self.len + values.len();
        if needed > self.storage.len() {
            let mut capacity = self.storage.len();
            while capacity < needed {
                capacity *= 2;
            }
            let mut grown = vec![T::default(); capacity];
            grown[..self.len].copy_from_slice(&self.storage[..self.len]);
            self.storage = grown;
        }

        self.storage[self.len..needed].copy_from_slice(values);
        self.len = needed;
    }

    /// Append a single value.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.append(&[value]);
    }
}

impl<T> GrowableBuffer<T> {
    /// Number of values appended so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the backing storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// The appended values.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// The whole backing storage, including unused slots past `len()`.
    #[inline]
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// Drop the unused tail and return the appended values.
    pub fn into_vec(mut self) -> Vec<T> {
        self.storage.truncate(self.len);
        self.storage
    }
}

#[cfg(test)]
mod growable_buffer_tests {
    use super::*;

    #[test]
    fn test_doubling_from_capacity_two() {
        let mut buffer = GrowableBuffer::<f32>::with_capacity(2);
        let mut capacities = vec![buffer.capacity()];

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            buffer.push(value);
            if *capacities.last().unwrap() != buffer.capacity() {
                capacities.push(buffer.capacity());
            }
        }

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(capacities, vec![2, 4, 8]);
        assert!(buffer.capacity() >= 5);
        assert_eq!(buffer.storage().len(), 8);
    }

    #[test]
    fn test_multi_value_append_grows_enough() {
        let mut buffer = GrowableBuffer::<f32>::with_capacity(2);
        buffer.append(&[0.0; 9]);
        assert_eq!(buffer.len(), 9);
        assert_eq!(buffer.capacity(), 16);

        buffer.append(&[1.0, 2.0, 3.0]);
        assert_eq!(&buffer.as_slice()[9..], &[1.0, 2.0, 3.0]);
        assert_eq!(buffer.into_vec().len(), 12);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = GrowableBuffer::<u32>::with_capacity(0);
        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.is_empty());
        buffer.append(&[]);
        assert!(buffer.is_empty());
        buffer.push(7);
        assert_eq!(buffer.as_slice(), &[7]);
    }
}

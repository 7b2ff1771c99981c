// Wed Jan 15 2026 - Alex

//! Turning a resolved code address into a typed function pointer.
//!
//! This is the sharpest edge of the crate. The metadata layout records where a
//! function starts, never what its signature is, so nothing here can check
//! that the pointer type the caller picks matches the code at the address.
//! Calling through a mismatched pointer is undefined behavior at the call
//! site, and no error is ever reported for it.

use crate::memory::Address;
use std::mem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallableError {
    #[error("Refusing to synthesize a callable for the null address")]
    NullAddress,
    #[error("Address {0} does not fit in a host pointer")]
    AddressOverflow(Address),
    #[error("Target type is {0} bytes, not a host code pointer")]
    NotPointerSized(usize),
}

/// Plain code pointer types a resolved address can become.
///
/// # Safety
///
/// Implementors must be pointer-sized function pointer types for which any
/// non-null code address is a valid bit pattern.
pub unsafe trait FunctionPointer: Copy {}

macro_rules! impl_function_pointer {
    ($($arg:ident),*) => {
        unsafe impl<R, $($arg),*> FunctionPointer for fn($($arg),*) -> R {}
        unsafe impl<R, $($arg),*> FunctionPointer for unsafe fn($($arg),*) -> R {}
        unsafe impl<R, $($arg),*> FunctionPointer for extern "C" fn($($arg),*) -> R {}
        unsafe impl<R, $($arg),*> FunctionPointer for unsafe extern "C" fn($($arg),*) -> R {}
    };
}

impl_function_pointer!();
impl_function_pointer!(A);
impl_function_pointer!(A, B);
impl_function_pointer!(A, B, C);
impl_function_pointer!(A, B, C, D);
impl_function_pointer!(A, B, C, D, E);
impl_function_pointer!(A, B, C, D, E, F);

/// Builds a function pointer of type `F` that jumps to `address`.
///
/// Only the address itself is validated: it must be non-null and
/// representable on the host.
///
/// # Safety
///
/// `address` must be the entry of live code that implements exactly the
/// signature and calling convention of `F`, and must stay mapped for as long
/// as the returned pointer is used. None of this is checked.
pub unsafe fn synthesize<F: FunctionPointer>(address: Address) -> Result<F, CallableError> {
    if address.is_null() {
        return Err(CallableError::NullAddress);
    }
    let raw = address
        .as_usize()
        .ok_or(CallableError::AddressOverflow(address))?;
    if mem::size_of::<F>() != mem::size_of::<usize>() {
        return Err(CallableError::NotPointerSized(mem::size_of::<F>()));
    }
    Ok(mem::transmute_copy::<usize, F>(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(value: i32) -> i32 {
        value * 2
    }

    extern "C" fn add(a: u64, b: u64) -> u64 {
        a + b
    }

    #[test]
    fn test_synthesizes_rust_fn() {
        let address = Address::new(double as fn(i32) -> i32 as usize as u64);
        let callable: fn(i32) -> i32 = unsafe { synthesize(address) }.unwrap();
        assert_eq!(callable(21), 42);
    }

    #[test]
    fn test_synthesizes_extern_c_fn() {
        let address = Address::new(add as extern "C" fn(u64, u64) -> u64 as usize as u64);
        let callable: extern "C" fn(u64, u64) -> u64 = unsafe { synthesize(address) }.unwrap();
        assert_eq!(callable(40, 2), 42);
    }

    #[test]
    fn test_null_address_rejected() {
        let result = unsafe { synthesize::<fn()>(Address::zero()) };
        assert!(matches!(result, Err(CallableError::NullAddress)));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_wide_address_rejected_on_narrow_hosts() {
        let address = Address::new(0x1_0000_0000);
        let result = unsafe { synthesize::<fn()>(address) };
        assert!(matches!(result, Err(CallableError::AddressOverflow(a)) if a == address));
    }
}

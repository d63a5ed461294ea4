/// Casts a callable to its native entry address.
///
/// A function item has no direct `usize` cast; the two-argument form routes
/// it through the concrete function-pointer type first. The one-argument
/// form is for values that already cast directly.
///
/// ```
/// use sidetour_rs::native_addr;
///
/// fn replacement() -> u32 {
///     7
/// }
///
/// let addr = native_addr!(replacement, fn() -> u32);
/// assert_ne!(addr, 0);
/// ```
#[macro_export]
macro_rules! native_addr {
    ($f:expr, $ty:ty) => {
        $f as $ty as usize
    };
    ($f:expr) => {
        $f as usize
    };
}

use crate::error::{Error, Result};

/// Something a hook or keybind can run.
///
/// Implemented for Lua functions and for plain Rust closures, so the
/// registries can be exercised without an interpreter.
pub trait ScriptCallback: Clone {
    fn invoke(&self) -> Result<()>;
}

impl ScriptCallback for mlua::Function {
    fn invoke(&self) -> Result<()> {
        self.call::<()>(()).map_err(Error::from)
    }
}

#[cfg(test)]
pub type NativeCallback = std::rc::Rc<dyn Fn() -> Result<()>>;

#[cfg(test)]
impl ScriptCallback for NativeCallback {
    fn invoke(&self) -> Result<()> {
        (self)()
    }
}

/// Wrap a closure as a [`NativeCallback`].
#[cfg(test)]
pub fn native(f: impl Fn() -> Result<()> + 'static) -> NativeCallback {
    std::rc::Rc::new(f)
}

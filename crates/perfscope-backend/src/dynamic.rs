//! Runtime-loaded vendor backend.
//!
//! The vendor ships one profiling module per rendering API; we pick the module
//! for the requested target, load it, and resolve every entry point up front
//! so a missing symbol fails at load time instead of at first use.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use libloading::Library;

use perfscope_core::{Error, ProfileApi, Result};

use crate::backend::{Backend, NativeContext};
use crate::ffi;

/// Convert a backend status into a `Result`.
fn check(status: ffi::RawStatus) -> Result<()> {
    if status == ffi::STATUS_OK {
        Ok(())
    } else {
        Err(Error::Status(status))
    }
}

/// Resolve one entry point, failing with the symbol's name if it is absent.
fn resolve<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let symbol = unsafe { library.get::<T>(name.as_bytes()) }
        .map_err(|_| Error::MissingSymbol(name))?;
    Ok(*symbol)
}

/// The resolved entry-point table of a loaded backend module.
///
/// Function pointers stay valid for as long as the owning [`Library`] is
/// mapped; [`DynamicBackend`] keeps both together.
struct EntryPoints {
    initialize: ffi::InitializeFn,
    destroy: ffi::DestroyFn,

    open_context: ffi::OpenContextFn,
    select_context: ffi::SelectContextFn,
    close_context: ffi::CloseContextFn,

    get_num_counters: ffi::GetNumCountersFn,
    get_counter_name: ffi::GetCounterNameFn,
    get_counter_data_type: ffi::GetCounterDataTypeFn,
    get_counter_usage_type: ffi::GetCounterUsageTypeFn,

    enable_counter: ffi::EnableCounterFn,
    disable_counter: ffi::DisableCounterFn,

    get_pass_count: ffi::GetPassCountFn,

    begin_session: ffi::BeginSessionFn,
    end_session: ffi::EndSessionFn,

    begin_pass: ffi::BeginPassFn,
    end_pass: ffi::EndPassFn,

    begin_sample: ffi::BeginSampleFn,
    end_sample: ffi::EndSampleFn,

    is_session_ready: ffi::IsSessionReadyFn,

    get_sample_u32: ffi::GetSampleUInt32Fn,
    get_sample_u64: ffi::GetSampleUInt64Fn,
    get_sample_f32: ffi::GetSampleFloat32Fn,
    get_sample_f64: ffi::GetSampleFloat64Fn,

    get_enabled_count: ffi::GetEnabledCountFn,
    get_enabled_index: ffi::GetEnabledIndexFn,
}

impl EntryPoints {
    /// Resolve the full table, eagerly, in declaration order.
    fn resolve_all(library: &Library) -> Result<Self> {
        Ok(Self {
            initialize: resolve(library, "GPA_Initialize")?,
            destroy: resolve(library, "GPA_Destroy")?,
            open_context: resolve(library, "GPA_OpenContext")?,
            select_context: resolve(library, "GPA_SelectContext")?,
            close_context: resolve(library, "GPA_CloseContext")?,
            get_num_counters: resolve(library, "GPA_GetNumCounters")?,
            get_counter_name: resolve(library, "GPA_GetCounterName")?,
            get_counter_data_type: resolve(library, "GPA_GetCounterDataType")?,
            get_counter_usage_type: resolve(library, "GPA_GetCounterUsageType")?,
            enable_counter: resolve(library, "GPA_EnableCounter")?,
            disable_counter: resolve(library, "GPA_DisableCounter")?,
            get_pass_count: resolve(library, "GPA_GetPassCount")?,
            begin_session: resolve(library, "GPA_BeginSession")?,
            end_session: resolve(library, "GPA_EndSession")?,
            begin_pass: resolve(library, "GPA_BeginPass")?,
            end_pass: resolve(library, "GPA_EndPass")?,
            begin_sample: resolve(library, "GPA_BeginSample")?,
            end_sample: resolve(library, "GPA_EndSample")?,
            is_session_ready: resolve(library, "GPA_IsSessionReady")?,
            get_sample_u32: resolve(library, "GPA_GetSampleUInt32")?,
            get_sample_u64: resolve(library, "GPA_GetSampleUInt64")?,
            get_sample_f32: resolve(library, "GPA_GetSampleFloat32")?,
            get_sample_f64: resolve(library, "GPA_GetSampleFloat64")?,
            get_enabled_count: resolve(library, "GPA_GetEnabledCount")?,
            get_enabled_index: resolve(library, "GPA_GetEnabledIndex")?,
        })
    }
}

/// Module file name for the requested rendering API on this platform.
#[cfg(target_os = "linux")]
fn module_name(api: ProfileApi) -> Result<&'static str> {
    match api {
        ProfileApi::OpenGl => Ok("libGPUPerfAPIGL.so"),
        ProfileApi::OpenCl => Ok("libGPUPerfAPICL.so"),
        other => Err(Error::UnsupportedApi(other)),
    }
}

/// Module file name for the requested rendering API on this platform.
#[cfg(target_os = "windows")]
fn module_name(api: ProfileApi) -> Result<&'static str> {
    match api {
        ProfileApi::Direct3D10 => Ok("GPUPerfAPIDX10-x64.dll"),
        ProfileApi::Direct3D11 => Ok("GPUPerfAPIDX11-x64.dll"),
        ProfileApi::OpenGl => Ok("GPUPerfAPIGL-x64.dll"),
        ProfileApi::OpenCl => Ok("GPUPerfAPICL-x64.dll"),
    }
}

/// Module file name for the requested rendering API on this platform.
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn module_name(api: ProfileApi) -> Result<&'static str> {
    Err(Error::UnsupportedApi(api))
}

/// A vendor backend loaded from a shared module at runtime.
///
/// Owns the module handle; dropping the backend unmaps the module, so no
/// entry point may be called after that point.
pub struct DynamicBackend {
    entry: EntryPoints,
    // Keeps the module mapped for as long as the entry points are callable.
    _library: Library,
}

impl DynamicBackend {
    /// Load the backend module for the requested rendering API and resolve
    /// its entry-point table.
    pub fn load(api: ProfileApi) -> Result<Self> {
        let name = module_name(api)?;
        let library = unsafe { Library::new(name) }
            .map_err(|e| Error::LibraryLoad(format!("{name}: {e}")))?;
        let entry = EntryPoints::resolve_all(&library)?;

        tracing::info!(module = name, ?api, "loaded profiling backend");

        Ok(Self {
            entry,
            _library: library,
        })
    }
}

impl Backend for DynamicBackend {
    fn initialize(&self) -> Result<()> {
        check(unsafe { (self.entry.initialize)() })
    }

    fn destroy(&self) -> Result<()> {
        check(unsafe { (self.entry.destroy)() })
    }

    unsafe fn open_context(&self, context: NativeContext) -> Result<()> {
        check(unsafe { (self.entry.open_context)(context) })
    }

    unsafe fn select_context(&self, context: NativeContext) -> Result<()> {
        check(unsafe { (self.entry.select_context)(context) })
    }

    fn close_context(&self) -> Result<()> {
        check(unsafe { (self.entry.close_context)() })
    }

    fn counter_count(&self) -> Result<u32> {
        let mut count = 0u32;
        check(unsafe { (self.entry.get_num_counters)(&mut count) })?;
        Ok(count)
    }

    fn counter_name(&self, index: u32) -> Result<String> {
        let mut name: *const c_char = ptr::null();
        check(unsafe { (self.entry.get_counter_name)(index, &mut name) })?;
        if name.is_null() {
            return Err(Error::NullPointer("GPA_GetCounterName"));
        }
        Ok(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }

    fn counter_data_type(&self, index: u32) -> Result<u32> {
        let mut raw = 0u32;
        check(unsafe { (self.entry.get_counter_data_type)(index, &mut raw) })?;
        Ok(raw)
    }

    fn counter_usage_type(&self, index: u32) -> Result<u32> {
        let mut raw = 0u32;
        check(unsafe { (self.entry.get_counter_usage_type)(index, &mut raw) })?;
        Ok(raw)
    }

    fn enable_counter(&self, index: u32) -> Result<()> {
        check(unsafe { (self.entry.enable_counter)(index) })
    }

    fn disable_counter(&self, index: u32) -> Result<()> {
        check(unsafe { (self.entry.disable_counter)(index) })
    }

    fn pass_count(&self) -> Result<u32> {
        let mut passes = 0u32;
        check(unsafe { (self.entry.get_pass_count)(&mut passes) })?;
        Ok(passes)
    }

    fn begin_session(&self) -> Result<u32> {
        let mut id = 0u32;
        check(unsafe { (self.entry.begin_session)(&mut id) })?;
        Ok(id)
    }

    fn end_session(&self) -> Result<()> {
        check(unsafe { (self.entry.end_session)() })
    }

    fn begin_pass(&self) -> Result<()> {
        check(unsafe { (self.entry.begin_pass)() })
    }

    fn end_pass(&self) -> Result<()> {
        check(unsafe { (self.entry.end_pass)() })
    }

    fn begin_sample(&self, id: u32) -> Result<()> {
        check(unsafe { (self.entry.begin_sample)(id) })
    }

    fn end_sample(&self) -> Result<()> {
        check(unsafe { (self.entry.end_sample)() })
    }

    fn session_ready(&self, session: u32) -> Result<bool> {
        let mut ready = false;
        check(unsafe { (self.entry.is_session_ready)(&mut ready, session) })?;
        Ok(ready)
    }

    fn sample_u32(&self, session: u32, sample: u32, counter: u32) -> Result<u32> {
        let mut value = 0u32;
        check(unsafe { (self.entry.get_sample_u32)(session, sample, counter, &mut value) })?;
        Ok(value)
    }

    fn sample_u64(&self, session: u32, sample: u32, counter: u32) -> Result<u64> {
        let mut value = 0u64;
        check(unsafe { (self.entry.get_sample_u64)(session, sample, counter, &mut value) })?;
        Ok(value)
    }

    fn sample_f32(&self, session: u32, sample: u32, counter: u32) -> Result<f32> {
        let mut value = 0f32;
        check(unsafe { (self.entry.get_sample_f32)(session, sample, counter, &mut value) })?;
        Ok(value)
    }

    fn sample_f64(&self, session: u32, sample: u32, counter: u32) -> Result<f64> {
        let mut value = 0f64;
        check(unsafe { (self.entry.get_sample_f64)(session, sample, counter, &mut value) })?;
        Ok(value)
    }

    fn enabled_count(&self) -> Result<u32> {
        let mut count = 0u32;
        check(unsafe { (self.entry.get_enabled_count)(&mut count) })?;
        Ok(count)
    }

    fn enabled_index(&self, position: u32) -> Result<u32> {
        let mut index = 0u32;
        check(unsafe { (self.entry.get_enabled_index)(position, &mut index) })?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_maps_to_ok() {
        assert!(check(ffi::STATUS_OK).is_ok());
    }

    #[test]
    fn failure_status_carries_the_code() {
        match check(-3) {
            Err(Error::Status(-3)) => {}
            other => panic!("expected Status(-3), got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_module_names() {
        assert_eq!(module_name(ProfileApi::OpenGl).unwrap(), "libGPUPerfAPIGL.so");
        assert_eq!(module_name(ProfileApi::OpenCl).unwrap(), "libGPUPerfAPICL.so");
        assert!(matches!(
            module_name(ProfileApi::Direct3D11),
            Err(Error::UnsupportedApi(ProfileApi::Direct3D11))
        ));
    }

    #[test]
    fn loading_a_missing_module_fails() {
        #[cfg(target_os = "linux")]
        {
            // No vendor driver in the test environment; loading must report
            // a module-load failure rather than panic.
            assert!(matches!(
                DynamicBackend::load(ProfileApi::OpenGl),
                Err(Error::LibraryLoad(_))
            ));
        }
    }
}

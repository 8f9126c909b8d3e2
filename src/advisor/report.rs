use crate::advisor::capacity::{advise_platform, DeviceReport};
use crate::models::{Device, Platform, Topology};
use std::io::{self, Write};

const LABEL_WIDTH: usize = 41;

/// Печатает отчёт по платформам и устройствам. С `verbose` добавляются
/// необязательные атрибуты платформ и устройств, если они есть в снимке.
pub fn write_report<W: Write>(topology: &Topology, out: &mut W, verbose: bool) -> io::Result<()> {
    if let Some(captured_at) = topology.captured_at {
        writeln!(out, "Snapshot captured {}", captured_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out)?;
    }

    if topology.is_empty() {
        writeln!(out, "No OpenCL platforms found in the snapshot.")?;
        return Ok(());
    }

    for platform in &topology.platforms {
        writeln!(out, "In {}: {}", platform.id, platform.name)?;
        if verbose {
            write_platform_details(out, platform)?;
        }
        for (device, report) in platform.devices.iter().zip(advise_platform(platform)) {
            write_device(out, device, &report)?;
            if verbose {
                write_device_details(out, device)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_platform_details<W: Write>(out: &mut W, platform: &Platform) -> io::Result<()> {
    if let Some(vendor) = &platform.vendor {
        line(out, "Platform vendor:", format_args!("{}", vendor))?;
    }
    if let Some(version) = &platform.version {
        line(out, "Platform version:", format_args!("{}", version.trim()))?;
    }
    if let Some(profile) = &platform.profile {
        line(out, "Platform profile:", format_args!("{}", profile))?;
    }
    if let Some(extensions) = &platform.extensions {
        line(out, "Platform extensions:", format_args!("{}", extensions.trim()))?;
    }
    Ok(())
}

fn write_device<W: Write>(out: &mut W, device: &Device, report: &DeviceReport) -> io::Result<()> {
    writeln!(out, "{}: {}", device.key(), report.device_name)?;
    line(
        out,
        "Device local memory size:",
        format_args!("{} bytes = {}kB", report.local_bytes, report.local_kib()),
    )?;
    line(
        out,
        "Max floating data points it can hold:",
        format_args!("{}", report.max_floats),
    )?;
    line(
        out,
        "Max SIZE of a square matrix it can hold:",
        format_args!(
            "{}x{} = {}",
            report.max_square_side, report.max_square_side, report.max_square_elements
        ),
    )
}

fn write_device_details<W: Write>(out: &mut W, device: &Device) -> io::Result<()> {
    if let Some(device_type) = &device.device_type {
        line(out, "Device type:", format_args!("{}", device_type))?;
    }
    if let Some(vendor) = &device.vendor {
        line(out, "Vendor:", format_args!("{}", vendor))?;
    }
    if let Some(version) = &device.version {
        line(out, "Version:", format_args!("{}", version.trim()))?;
    }
    if let Some(version) = &device.opencl_c_version {
        line(out, "OpenCL C version:", format_args!("{}", version.trim()))?;
    }
    if let Some(bytes) = device.global_memory_size_bytes {
        line(
            out,
            "Global memory size:",
            format_args!("{} bytes = {}MB", bytes, bytes / (1024 * 1024)),
        )?;
    }
    if let Some(bytes) = device.global_memory_cache_size_bytes {
        line(
            out,
            "Global memory cache size:",
            format_args!("{} bytes = {}kB", bytes, bytes / 1024),
        )?;
    }
    if let Some(bytes) = device.max_constant_buffer_size_bytes {
        line(
            out,
            "Max constant buffer size:",
            format_args!("{} bytes = {}kB", bytes, bytes / 1024),
        )?;
    }
    if let Some(size) = device.max_work_group_size {
        line(out, "Max work-group size:", format_args!("{}", size))?;
    }
    if let Some(dims) = device.max_work_item_dimensions {
        line(out, "Max work-item dimensions:", format_args!("{}", dims))?;
    }
    Ok(())
}

fn line<W: Write>(out: &mut W, label: &str, value: std::fmt::Arguments<'_>) -> io::Result<()> {
    writeln!(out, " {:<width$}{}", label, value, width = LABEL_WIDTH)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .file_descriptor_set_path("gopher_descriptor.bin")
        .compile_protos(&["../../proto/gopher.proto"], &["../../proto"])?;
    Ok(())
}

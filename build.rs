fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 服务端代码只在客户端测试里用到
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/auth.proto"], &["proto"])?;
    Ok(())
}

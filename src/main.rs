use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    llamabot::cli::main()
}

use std::env;
use std::path::Path;

use tipsim::Page;

fn main() {
    let arg = env::args().nth(1).unwrap_or_else(|| "demos/page.html".to_string());
    match Page::load(Path::new(&arg)) {
        Ok(page) => print!("{}", page.dump(false)),
        Err(e) => println!("Error: {}", e),
    }
}

//! c3-terrain - Command-line interface for c3save
//!
//! Prints the terrain map of a Caesar III save, or decodes single compressed
//! chunks to disk.

use c3save::explode::ExplodeReader;
use c3save::{ChunkHeader, ExplodeOptions, SaveLayout, SaveReader, TerrainFlags};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "c3-terrain")]
#[command(about = "Read terrain and compressed chunks from Caesar III save files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the terrain map of a save file
    Terrain {
        /// Save file to read
        input: PathBuf,

        /// Side length of the terrain grid
        #[arg(long, default_value_t = SaveLayout::default().grid_size)]
        grid_size: usize,

        /// Compressed chunks preceding the terrain chunk
        #[arg(long, default_value_t = SaveLayout::default().chunks_before_terrain)]
        skip_chunks: usize,

        /// Bytes before the first chunk
        #[arg(long, default_value_t = SaveLayout::default().preamble_len)]
        preamble: u64,

        /// Bytes read from disk per refill
        #[arg(long, default_value_t = ExplodeOptions::default().buffer_size)]
        buffer_size: usize,

        /// Print cell counts per terrain kind after the map
        #[arg(long)]
        summary: bool,
    },

    /// Decompress a single raw chunk
    Explode {
        /// File containing the chunk
        input: PathBuf,

        /// Output file for the decoded bytes
        output: PathBuf,

        /// Byte offset of the chunk header
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Declared chunk length (defaults to the rest of the file)
        #[arg(long)]
        length: Option<u32>,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a raw chunk
    Info {
        /// File containing the chunk
        input: PathBuf,

        /// Byte offset of the chunk header
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Declared chunk length (defaults to the rest of the file)
        #[arg(long)]
        length: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Terrain {
            input,
            grid_size,
            skip_chunks,
            preamble,
            buffer_size,
            summary,
        } => {
            let layout = SaveLayout {
                preamble_len: preamble,
                chunks_before_terrain: skip_chunks,
                grid_size,
            };
            let options = ExplodeOptions::default().with_buffer_size(buffer_size);
            print_terrain(&input, layout, options, summary)
        }
        Commands::Explode {
            input,
            output,
            offset,
            length,
            force,
        } => explode_file(&input, &output, offset, length, force, cli.verbose, cli.quiet),
        Commands::Info {
            input,
            offset,
            length,
        } => show_chunk_info(&input, offset, length, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Error);
    }
    builder.init();
}

fn print_terrain(
    input: &Path,
    layout: SaveLayout,
    options: ExplodeOptions,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let mut save = SaveReader::open(input)?
        .with_layout(layout)
        .with_options(options);
    let terrain = save.read_terrain()?;

    print!("{terrain}");

    if summary {
        println!();
        for (name, kind) in [
            ("Trees", TerrainFlags::TREE),
            ("Rocks", TerrainFlags::ROCK),
            ("Water", TerrainFlags::WATER),
            ("Buildings", TerrainFlags::BUILDING),
            ("Roads", TerrainFlags::ROAD),
            ("Meadow", TerrainFlags::MEADOW),
        ] {
            println!("  {:<10} {}", name, terrain.count(kind));
        }
    }

    Ok(())
}

/// Open `input` at the chunk and resolve its declared length
fn open_chunk(
    input: &Path,
    offset: u64,
    length: Option<u32>,
) -> Result<(BufReader<File>, u32), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let mut file = File::open(input)?;
    let file_len = file.metadata()?.len();
    if offset >= file_len {
        return Err(format!("Offset {} is past the end of the file ({} bytes)", offset, file_len).into());
    }

    let length = match length {
        Some(length) => length,
        None => u32::try_from(file_len - offset)?,
    };

    file.seek(SeekFrom::Start(offset))?;
    Ok((BufReader::new(file), length))
}

fn explode_file(
    input: &Path,
    output: &Path,
    offset: u64,
    length: Option<u32>,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    let (source, length) = open_chunk(input, offset, length)?;

    if verbose {
        println!(
            "Decompressing '{}' (offset {}, {} bytes) to '{}'",
            input.display(),
            offset,
            length,
            output.display()
        );
    }

    let start_time = Instant::now();

    // Show a spinner for large chunks
    let progress = if !quiet && length > 1024 * 1024 {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg} {bytes}")
                .expect("valid progress template"),
        );
        pb.set_message("Decompressing...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut reader = ExplodeReader::new(source, length)?;
    let mut decompressed = Vec::new();
    let mut block = [0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut block)?;
        if read == 0 {
            break;
        }
        decompressed.extend_from_slice(&block[..read]);
        if let Some(ref pb) = progress {
            pb.set_position(decompressed.len() as u64);
        }
    }

    if let Some(ref pb) = progress {
        pb.finish_with_message("Decompression complete");
    }

    fs::write(output, &decompressed)?;

    let elapsed = start_time.elapsed();
    let stats = reader.stats();

    if !quiet {
        println!("✓ Decompression successful!");
        println!("  Input:  {} bytes", length);
        println!("  Output: {} bytes", decompressed.len());
        println!(
            "  Codes:  {} literals, {} copies",
            stats.literal_count, stats.copy_count
        );
        println!("  Time:   {:.2?}", elapsed);
    }

    Ok(())
}

fn show_chunk_info(
    input: &Path,
    offset: u64,
    length: Option<u32>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut source, length) = open_chunk(input, offset, length)?;

    let mut raw = [0u8; 2];
    source.read_exact(&mut raw)?;
    source.seek(SeekFrom::Current(-2))?;

    println!("Chunk Information:");
    println!("  File:   {}", input.display());
    println!("  Offset: {}", offset);
    println!("  Length: {} bytes", length);

    if verbose {
        println!("  Header bytes: {:02x} {:02x}", raw[0], raw[1]);
    }

    match ChunkHeader::parse(raw) {
        Ok(header) => println!(
            "  Dictionary: {} bytes ({} offset bits)",
            header.dict_size.capacity(),
            header.dict_size.bits()
        ),
        Err(e) => {
            println!("  Status: ✗ Invalid header");
            return Err(e.into());
        }
    }

    let mut reader = ExplodeReader::new(source, length)?;
    match reader.decode_to_end() {
        Ok(decompressed) => {
            let stats = reader.stats();
            println!("  Decompressed Size: {} bytes", decompressed.len());
            println!(
                "  Compressed Used:   {} of {} payload bytes",
                reader.compressed_bytes_consumed(),
                length - 2
            );
            println!("  Literals: {}", stats.literal_count);
            println!("  Copies:   {}", stats.copy_count);
            println!("  Longest copy: {}", stats.longest_copy);
            println!("  Status: ✓ Valid chunk");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or truncated chunk");
            return Err(e.into());
        }
    }

    Ok(())
}

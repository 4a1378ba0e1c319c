//! DmaUartConsole - ESP32 test-channel firmware
//!
//! Brings up one command channel on UART1 and a log-only UART2, then runs
//! both pumps and the console from a single task:
//!
//! 1. poll the receive ring (immediately after a notification, else on
//!    the poll period)
//! 2. feed inbound bytes to the console, which dispatches complete lines
//! 3. flush queued responses
//! 4. drain the log stream

#![no_std]
#![no_main]

use esp_idf_svc::sys as esp_idf_sys;

use core::fmt::Write;

use dma_uart_console::config::{DEFAULT_HISTORY_DEPTH, DEFAULT_LINE_SIZE, DEFAULT_MAX_COMMANDS};
use dma_uart_console::console::{CommandError, ParsedCommand};
use dma_uart_console::hal::esp::{EspClock, UartRxAdapter, UartTxAdapter};
use dma_uart_console::log_drain::{drain_logs, UartLogWriter};
use dma_uart_console::logging::LogLevel;
use dma_uart_console::{
    chan_error, chan_info, ChannelConfig, ChannelStats, Clock, CommandTable, Console,
    ResponseSink, SerialChannel, LOG_STREAM,
};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver, UartTxDriver};
use static_cell::StaticCell;

static CHANNEL: StaticCell<SerialChannel> = StaticCell::new();
static COMMANDS: StaticCell<CommandTable<Board, DEFAULT_MAX_COMMANDS>> = StaticCell::new();

type BoardConsole =
    Console<'static, Board, DEFAULT_LINE_SIZE, DEFAULT_HISTORY_DEPTH, DEFAULT_MAX_COMMANDS>;

/// Handler context: what test commands may look at or change.
struct Board {
    stats: &'static ChannelStats,
}

#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let config = ChannelConfig::default();
    let clock = EspClock;

    let Ok(peripherals) = Peripherals::take() else {
        return;
    };

    // Board wiring: command UART1 TX on GPIO17, RX on GPIO18; log UART2 TX on GPIO6.
    let uart_config = UartConfig::default().baudrate(Hertz(config.baud_rate));
    let command_uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    );
    let log_uart = UartTxDriver::new(
        peripherals.uart2,
        peripherals.pins.gpio6,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(115_200)),
    );

    let (Ok(command_uart), Ok(mut log_uart)) = (command_uart, log_uart) else {
        return;
    };
    let (uart_tx, uart_rx) = command_uart.into_split();

    let channel: &'static mut SerialChannel = CHANNEL.init(SerialChannel::new());
    let mut parts = channel.split(
        UartRxAdapter::new(uart_rx),
        UartTxAdapter::new(uart_tx),
        clock,
        &config,
    );

    let commands = COMMANDS.init(build_commands());
    if let Some((earlier, later)) = commands.find_shadowed() {
        chan_error!(
            LOG_STREAM,
            clock.now_us(),
            config.channel,
            "command {} unreachable behind {}",
            commands.prefixes().nth(later).unwrap_or("?"),
            commands.prefixes().nth(earlier).unwrap_or("?")
        );
    }

    let mut board = Board { stats: parts.stats };
    let mut console: BoardConsole = Console::new(commands, config.prompt);

    if let Err(err) = parts.rx.start() {
        chan_error!(LOG_STREAM, clock.now_us(), config.channel, "rx start: {}", err);
        return;
    }
    console.print_banner(&mut parts.io.sink());
    chan_info!(
        LOG_STREAM,
        clock.now_us(),
        config.channel,
        "console up at {} baud",
        config.baud_rate
    );

    let mut log_writer = UartLogWriter(&mut log_uart);
    loop {
        // One line per pass, then drain its response before the next one.
        loop {
            parts.rx.poll_receive();
            let fed = console.run(&mut parts.io, &mut board);

            while parts.tx.has_pending() {
                match parts.tx.flush_transmit() {
                    Ok(0) => break,
                    Ok(_) => {}
                    // Already logged and counted by the pump.
                    Err(_) => break,
                }
            }

            if fed == 0 || !parts.io.has_input() {
                break;
            }
        }

        drain_logs(&LOG_STREAM, &mut log_writer);

        if !parts.rx.take_notification() {
            FreeRtos::delay_ms(config.poll_period_ms);
        }
    }
}

/// Test-channel command set. More specific prefixes come first.
fn build_commands() -> CommandTable<Board, DEFAULT_MAX_COMMANDS> {
    let mut table = CommandTable::new();
    let entries: [(&'static str, dma_uart_console::console::Handler<Board>); 5] = [
        ("$STATC", cmd_stats_clear),
        ("$STAT", cmd_stats),
        ("$LOG", cmd_log_level),
        ("$ECHO", cmd_echo),
        ("$HCI", cmd_version),
    ];
    for (prefix, handler) in entries {
        if table.register_command(prefix, handler).is_err() {
            break;
        }
    }
    table
}

fn cmd_version(_board: &mut Board, _cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    out.emit_fmt(format_args!("{}\r\n", dma_uart_console::console::VERSION));
}

fn cmd_stats(board: &mut Board, _cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    let s = board.stats.snapshot();
    out.emit_fmt(format_args!(
        "RX {} DEF {} RXE {} LINE {}\r\nTX {}/{} TXE {} TMO {} DROP {}\r\n",
        s.rx_bytes,
        s.rx_deferrals,
        s.rx_errors,
        s.line_errors,
        s.tx_bytes,
        s.tx_transfers,
        s.tx_errors,
        s.tx_timeouts,
        s.tx_dropped
    ));
}

fn cmd_stats_clear(board: &mut Board, _cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    board.stats.clear();
    out.emit(b"OK\r\n");
}

fn cmd_log_level(_board: &mut Board, cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    if cmd.arg_count() == 0 {
        out.emit_fmt(format_args!("{}\r\n", LOG_STREAM.level().as_str()));
        return;
    }
    match cmd.parse_arg::<u8>(0) {
        Ok(raw) if raw <= LogLevel::Trace as u8 => {
            LOG_STREAM.set_level(LogLevel::from_u8(raw));
            out.emit(b"OK\r\n");
        }
        Ok(_) => out.error(CommandError::OutOfRange),
        Err(err) => out.error(err),
    }
}

fn cmd_echo(_board: &mut Board, cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    let mut line: heapless::String<64> = heapless::String::new();
    for word in cmd.args.iter().flatten() {
        if !line.is_empty() {
            let _ = line.push(' ');
        }
        let _ = line.write_str(word);
    }
    out.emit_fmt(format_args!("{}\r\n", line));
}

use check_icmp::ping::{CorrelationEvent, Pinger};
use std::net::{IpAddr, Ipv6Addr};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() {
    // ICMPv6 ping to cloudflare's one.one.one.one (2606:4700:4700::1111)
    let dst_ip: IpAddr = IpAddr::V6(Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111));
    let pinger: Pinger = Pinger::new(dst_ip);
    let mut rx = pinger.get_progress_receiver();

    println!("Progress:");
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(CorrelationEvent::Sender { sequence, .. }) => println!("{} sent", sequence),
                Ok(CorrelationEvent::Receiver(reply)) => {
                    println!("{} {} {}", reply.sequence, reply.source, reply.size)
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = pinger.ping_async().await;
    drop(pinger);
    let _ = printer.await;

    println!("Result:");
    match result {
        Ok(r) => {
            println!("Status: {:?}", r.status);
            for result in r.results {
                println!("{:?}", result);
            }
            println!("Statistics: {:?}", r.statistics);
            println!("Probe Time: {:?}", r.probe_time);
        }
        Err(e) => {
            print!("{}", e);
        }
    }
}
